use log::trace;

use crate::MemoryError;

pub const PAGE_SIZE: usize = 4096;

pub const fn size_to_pages(size: usize) -> usize {
    size.div_ceil(PAGE_SIZE)
}

/// Hands out 4 KiB pages from one region, front to back. Pages are never returned.
#[derive(Debug)]
pub struct PageAllocator {
    next: usize,
    end: usize,
}

impl PageAllocator {
    /// `base` is rounded up and `base + size` down to page boundaries.
    pub const fn new(base: usize, size: usize) -> Self {
        let end = base.saturating_add(size) / PAGE_SIZE * PAGE_SIZE;
        let start = match base.checked_next_multiple_of(PAGE_SIZE) {
            Some(start) => start,
            None => end,
        };
        Self {
            next: start,
            end: if end < start { start } else { end },
        }
    }

    pub fn free_pages(&self) -> usize {
        (self.end - self.next) / PAGE_SIZE
    }

    /// Returns the address of `count` contiguous pages.
    pub fn allocate_pages(&mut self, count: usize) -> Result<usize, MemoryError> {
        if count == 0 {
            return Err(MemoryError::ZeroPages);
        }
        let available = self.free_pages();
        if count > available {
            return Err(MemoryError::OutOfPages {
                requested: count,
                available,
            });
        }
        let addr = self.next;
        self.next += count * PAGE_SIZE;
        trace!("allocated {count} pages at {addr:#x}");
        Ok(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_front_to_back() {
        let mut alloc = PageAllocator::new(0x1000, 4 * PAGE_SIZE);
        assert_eq!(alloc.allocate_pages(1), Ok(0x1000));
        assert_eq!(alloc.allocate_pages(2), Ok(0x2000));
        assert_eq!(alloc.free_pages(), 1);
        assert_eq!(
            alloc.allocate_pages(2),
            Err(MemoryError::OutOfPages {
                requested: 2,
                available: 1
            })
        );
        assert_eq!(alloc.allocate_pages(1), Ok(0x4000));
        assert_eq!(alloc.free_pages(), 0);
    }

    #[test]
    fn unaligned_region_is_trimmed() {
        let alloc = PageAllocator::new(0x1800, 3 * PAGE_SIZE);
        // 0x1800..0x4800 holds the pages at 0x2000 and 0x3000.
        assert_eq!(alloc.free_pages(), 2);
        assert_eq!(PageAllocator::new(0x1800, 0x100).free_pages(), 0);
    }

    #[test]
    fn region_at_top_of_address_space_is_clamped() {
        let mut alloc = PageAllocator::new(usize::MAX - 2 * PAGE_SIZE + 1, 4 * PAGE_SIZE);
        // The page touching the top of the address space is cut off.
        assert_eq!(alloc.free_pages(), 1);
        assert_eq!(alloc.allocate_pages(1), Ok(usize::MAX - 2 * PAGE_SIZE + 1));
        assert_eq!(alloc.free_pages(), 0);
        assert_eq!(PageAllocator::new(usize::MAX, PAGE_SIZE).free_pages(), 0);
    }

    #[test]
    fn zero_pages_is_an_error() {
        let mut alloc = PageAllocator::new(0, PAGE_SIZE);
        assert_eq!(alloc.allocate_pages(0), Err(MemoryError::ZeroPages));
        assert_eq!(size_to_pages(1), 1);
        assert_eq!(size_to_pages(PAGE_SIZE + 1), 2);
    }
}
