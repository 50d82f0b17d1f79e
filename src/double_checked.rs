use core::{
    cell::Cell,
    marker::PhantomData,
    ptr,
    sync::atomic::{AtomicPtr, Ordering},
};

use alloc::boxed::Box;

use crate::spin::SpinLock;

///
/// 双重检查锁定式单例
/// 第一次检查不拿锁，槽位是空的才去拿锁，
/// 拿到锁之后再检查一次，因为等锁期间别的线程可能已经构造好了
/// 这样只有第一次构造附近的调用需要同步，之后的调用都走无锁快路径
/// 槽位必须是原子指针：Release/Acquire保证实例的所有写入
/// 先于指针的发布，别的线程不会看到构造到一半的实例
/// # Example
/// ```
/// use xx_singleton::DoubleCheckedSingleton;
///
/// static INSTANCE: DoubleCheckedSingleton<i32> = DoubleCheckedSingleton::new(|| 3);
///
/// assert_eq!(*INSTANCE.get_instance(), 3);
/// ```
pub struct DoubleCheckedSingleton<T, F = fn() -> T> {
    slot: AtomicPtr<T>,
    lock: SpinLock,
    init: Cell<Option<F>>,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send + Sync, F: Send> Sync for DoubleCheckedSingleton<T, F> {}
unsafe impl<T: Send, F: Send> Send for DoubleCheckedSingleton<T, F> {}

impl<T, F: FnOnce() -> T> DoubleCheckedSingleton<T, F> {
    pub const fn new(init: F) -> Self {
        Self {
            slot: AtomicPtr::new(ptr::null_mut()),
            lock: SpinLock::new(),
            init: Cell::new(Some(init)),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.slot.load(Ordering::Acquire).is_null()
    }

    ///快路径：一次Acquire读，不拿锁
    #[inline]
    pub fn get_instance(&self) -> &T {
        let ptr = self.slot.load(Ordering::Acquire);
        if !ptr.is_null() {
            return unsafe { &*ptr };
        }
        self.initialize()
    }

    //慢路径：拿锁，第二次检查，还是空的才构造
    #[cold]
    fn initialize(&self) -> &T {
        let _guard = self.lock.lock();
        //等锁期间可能已经有线程构造好了
        let ptr = self.slot.load(Ordering::Acquire);
        if !ptr.is_null() {
            return unsafe { &*ptr };
        }
        let f = match self.init.take() {
            Some(f) => f,
            //闭包只会在第二次检查之后被取走一次
            None => panic!("singleton constructor previously panicked"),
        };
        let fresh = Box::into_raw(Box::new(f()));
        //Release保证实例的写入先于指针的发布
        self.slot.store(fresh, Ordering::Release);
        unsafe { &*fresh }
    }
}

impl<T, F> Drop for DoubleCheckedSingleton<T, F> {
    fn drop(&mut self) {
        let ptr = *self.slot.get_mut();
        if !ptr.is_null() {
            unsafe { drop(Box::from_raw(ptr)) };
        }
    }
}
