//! Integer-mode divisor search.

use bsp_clock::{ClockError, PllDivisors, MHZ};

#[test]
fn search_finds_exact_match_for_148_5_mhz() {
    let div = PllDivisors::search(148_500_000).expect("148.5 MHz is reachable");
    assert_eq!(div.refdiv, 8);
    assert_eq!(div.fbdiv, 297);
    assert_eq!(div.postdiv1, 6);
    assert_eq!(div.postdiv2, 1);
    assert_eq!(div.freq, 148_500_000);
    assert_eq!(div.output_khz(), Some(148_500));
    assert_eq!(div.validate(), Ok(()));
}

#[test]
fn search_stops_at_first_exact_match() {
    // refdiv 1 and 2 leave 8 MHz and 4 MHz of error, refdiv 3 is exact.
    let div = PllDivisors::search(800 * MHZ).unwrap();
    assert_eq!((div.refdiv, div.fbdiv, div.postdiv1, div.postdiv2), (3, 100, 1, 1));
    assert_eq!(div.vco_khz(), Some(800_000));
}

#[test]
fn search_splits_large_post_divider() {
    // 800 MHz / 27 MHz needs a total post divider of 30.
    let div = PllDivisors::search(27 * MHZ).unwrap();
    assert_eq!((div.postdiv1, div.postdiv2), (6, 5));
    assert_eq!((div.refdiv, div.fbdiv), (4, 135));
    assert_eq!(div.vco_khz(), Some(810_000));
}

#[test]
fn search_rejects_zero() {
    assert_eq!(PllDivisors::search(0), Err(ClockError::ZeroFrequency));
}

#[test]
fn search_rejects_unreachable_post_divider() {
    assert_eq!(
        PllDivisors::search(10 * MHZ),
        Err(ClockError::NoSupportedVco { freq_hz: 10 * MHZ })
    );
}

#[test]
fn search_rejects_vco_above_range() {
    assert_eq!(
        PllDivisors::search(3300 * MHZ),
        Err(ClockError::NoSupportedVco { freq_hz: 3300 * MHZ })
    );
}
