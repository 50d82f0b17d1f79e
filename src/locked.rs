use core::{
    cell::{Cell, UnsafeCell},
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::spin::SpinLock;

///
/// 方法级加锁式单例
/// 和懒汉式一样的 检查-构造 逻辑，但整个get_instance都在锁里
/// 正确性没有问题，代价是实例已经存在之后的每一次调用也要先拿锁，
/// 而99%的调用其实不需要同步，这个开销正是这个写法要演示的点，不要优化掉
/// # Example
/// ```
/// use xx_singleton::LockedSingleton;
///
/// static INSTANCE: LockedSingleton<i32> = LockedSingleton::new(|| 3);
///
/// assert_eq!(*INSTANCE.get_instance(), 3);
/// assert_eq!(INSTANCE.lock_acquisitions(), 1);
/// ```
pub struct LockedSingleton<T, F = fn() -> T> {
    lock: SpinLock,
    //统计拿锁的次数，用来证明每一次调用都经过了锁
    acquisitions: AtomicUsize,
    slot: UnsafeCell<Option<T>>,
    init: Cell<Option<F>>,
}

unsafe impl<T: Send + Sync, F: Send> Sync for LockedSingleton<T, F> {}
unsafe impl<T: Send, F: Send> Send for LockedSingleton<T, F> {}

impl<T, F: FnOnce() -> T> LockedSingleton<T, F> {
    pub const fn new(init: F) -> Self {
        Self {
            lock: SpinLock::new(),
            acquisitions: AtomicUsize::new(0),
            slot: UnsafeCell::new(None),
            init: Cell::new(Some(init)),
        }
    }

    ///拿锁的累计次数
    #[inline]
    pub fn lock_acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Relaxed)
    }

    ///每一次调用都要先拿锁，包括实例已经存在之后的调用
    pub fn get_instance(&self) -> &T {
        let _guard = self.lock.lock();
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        let slot = self.slot.get();
        //锁里的 检查-构造，逻辑和懒汉式相同，只是被锁串行化了
        if unsafe { (*slot).is_none() } {
            let f = match self.init.take() {
                Some(f) => f,
                //闭包只会在锁里被取走一次，取不到说明上一次构造panic了
                None => panic!("singleton constructor previously panicked"),
            };
            unsafe { *slot = Some(f()) };
        }
        //实例一旦写入就不会再改动，引用可以活过守卫
        match unsafe { &*slot } {
            Some(instance) => instance,
            None => panic!("never run here"),
        }
    }
}
