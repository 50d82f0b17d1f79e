use core::sync::atomic::{AtomicBool, Ordering};

///
/// 自旋锁，不带数据
/// 单例的槽位放在各个变体自己手里，这里只负责互斥
/// 拿不到锁时一直循环，直到拿到为止
/// # Example
///
/// ```
/// use xx_singleton::SpinLock;
/// let lock = SpinLock::new();
/// let guard = lock.lock();
/// //guard存在期间的代码是临界代码
/// drop(guard);
/// ```
/// 当guard被drop时，自动解锁
pub struct SpinLock {
    locked: AtomicBool,
}

/// 自旋锁守卫
/// 守卫存在期间表示持有锁
pub struct SpinGuard<'a> {
    locked: &'a AtomicBool,
}

impl SpinLock {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// 上锁
    pub fn lock(&self) -> SpinGuard<'_> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while self.is_locked() {
                core::hint::spin_loop();
            }
        }
        SpinGuard {
            locked: &self.locked,
        }
    }
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.locked.store(false, Ordering::Release)
    }
}
