//! Software prefetch hint for the data-dependent loads of histogram loops.

#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};

/// Hint the CPU to pull `slice[index]` into all cache levels.
///
/// Out-of-range indices are ignored. No-op on non-x86 architectures.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub fn prefetch_t0<T>(slice: &[T], index: usize) {
    if index < slice.len() {
        // SAFETY: the address lies inside `slice`; prefetch never faults and
        // has no observable effect besides cache state.
        unsafe {
            _mm_prefetch::<_MM_HINT_T0>(slice.as_ptr().add(index) as *const i8);
        }
    }
}

/// Hint the CPU to pull `slice[index]` into all cache levels.
///
/// Out-of-range indices are ignored. No-op on non-x86 architectures.
#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub fn prefetch_t0<T>(_slice: &[T], _index: usize) {}
