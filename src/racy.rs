use core::{
    marker::PhantomData,
    ptr,
    sync::atomic::{AtomicPtr, Ordering},
};

use alloc::boxed::Box;

///
/// 懒汉式单例，线程不安全
/// 第一次调用get_instance的时候才构造实例
/// 检查-构造 这段窗口没有任何同步原语保护，
/// 两个线程可能同时看到空槽，各自构造出一个实例，
/// 这正是这个写法要演示的竞争，不是要修掉的bug
/// # Example
/// ```
/// use xx_singleton::RacySingleton;
///
/// static INSTANCE: RacySingleton<i32> = RacySingleton::new(|| 3);
///
/// assert_eq!(*INSTANCE.get_instance(), 3);
/// ```
/// 跨线程共享要求`T: Send + Sync`：实例可能在一个线程构造、
/// 在另一个线程被drop释放，只有`Sync`没有`Send`的类型不能共享
/// ```compile_fail
/// use std::sync::MutexGuard;
/// use xx_singleton::RacySingleton;
///
/// fn require_sync<S: Sync>() {}
/// require_sync::<RacySingleton<MutexGuard<'static, ()>>>();
/// ```
pub struct RacySingleton<T, F = fn() -> T> {
    slot: AtomicPtr<T>,
    init: F,
    _marker: PhantomData<T>,
}

//init可能被多个线程同时经由&self调用，所以这里要的是F: Sync
unsafe impl<T: Send + Sync, F: Sync> Sync for RacySingleton<T, F> {}
unsafe impl<T: Send, F: Send> Send for RacySingleton<T, F> {}

impl<T, F: Fn() -> T> RacySingleton<T, F> {
    pub const fn new(init: F) -> Self {
        Self {
            slot: AtomicPtr::new(ptr::null_mut()),
            init,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.slot.load(Ordering::Acquire).is_null()
    }

    ///检查槽位，是空的就构造一个新实例存进去
    ///没有锁，写入用的是普通store而不是compare_exchange，
    ///竞争失败的一方拿到的引用和别人不同，它那个实例也会泄漏
    pub fn get_instance(&self) -> &T {
        let ptr = self.slot.load(Ordering::Acquire);
        if !ptr.is_null() {
            return unsafe { &*ptr };
        }
        //两个线程可能都走到这里，各自构造一个实例
        let fresh = Box::into_raw(Box::new((self.init)()));
        //Release只保证实例内容的可见性，解决不了重复构造
        self.slot.store(fresh, Ordering::Release);
        unsafe { &*fresh }
    }
}

impl<T, F> Drop for RacySingleton<T, F> {
    fn drop(&mut self) {
        let ptr = *self.slot.get_mut();
        if !ptr.is_null() {
            unsafe { drop(Box::from_raw(ptr)) };
        }
    }
}
