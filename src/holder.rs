use core::{
    cell::{Cell, UnsafeCell},
    mem::MaybeUninit,
    sync::atomic::{AtomicU8, Ordering},
};

///一共四种状态
/// 用来表示持有者的初始化进度
/// 对应 未初始化 -> 初始化中 -> 初始化完成 的状态机
pub mod status {
    pub const UNINITIALIZED: u8 = 0x00;
    pub const INITIALIZING: u8 = 0x01;
    pub const INITIALIZED: u8 = 0x02;
    pub const POISONED: u8 = 0x03;
}
use status::*;

///
/// 静态持有者式单例
/// 把唯一性交给一个最多只会初始化一次的持有者，
/// 第一次访问时由竞争成功的那个线程构造实例，其他线程自旋等它完成
/// 初始化完成之后的访问只有一次原子读，没有锁也没有额外分支
/// # Example
/// ```
/// use xx_singleton::HolderSingleton;
///
/// static INSTANCE: HolderSingleton<i32> = HolderSingleton::new(|| 3);
///
/// assert_eq!(*INSTANCE.get_instance(), 3);
/// ```
pub struct HolderSingleton<T, F = fn() -> T> {
    status: AtomicU8,
    instance: UnsafeCell<MaybeUninit<T>>,
    init: Cell<Option<F>>,
}

unsafe impl<T: Send + Sync, F: Send> Sync for HolderSingleton<T, F> {}
unsafe impl<T: Send, F: Send> Send for HolderSingleton<T, F> {}

impl<T, F: FnOnce() -> T> HolderSingleton<T, F> {
    pub const fn new(init: F) -> Self {
        Self {
            status: AtomicU8::new(UNINITIALIZED),
            instance: UnsafeCell::new(MaybeUninit::uninit()),
            init: Cell::new(Some(init)),
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.status.load(Ordering::Acquire) == INITIALIZED
    }

    ///只在已经初始化的情况下返回实例，不触发初始化
    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.is_initialized() {
            Some(unsafe { self.get_unchecked() })
        } else {
            None
        }
    }

    ///返回唯一实例，还没初始化就先初始化
    ///快路径只有一次原子读
    #[inline]
    pub fn get_instance(&self) -> &T {
        if !self.is_initialized() {
            self.initialize();
        }
        unsafe { self.get_unchecked() }
    }

    #[cold]
    fn initialize(&self) {
        loop {
            // compare_exchange 是原子的交换，只有一个线程会成功，
            // 成功的线程把状态换成INITIALIZING，由它来构造实例
            // 失败的线程会拿到当前状态
            let xchg = self.status.compare_exchange(
                UNINITIALIZED,
                INITIALIZING,
                Ordering::Acquire,
                Ordering::Acquire,
            );
            match xchg {
                Ok(_must_be_uninitialized) => {
                    //为了易读性，实现写在下面
                }
                //构造实例的那个线程panic了
                Err(status::POISONED) => panic!("singleton constructor panicked"),
                //别的线程正在构造，自旋等它离开INITIALIZING
                Err(status::INITIALIZING) => {
                    while self.status.load(Ordering::Acquire) == INITIALIZING {
                        core::hint::spin_loop();
                    }
                    continue;
                }
                //别的线程已经构造完了
                Err(status::INITIALIZED) => return,
                //因为其他原因没交换成功（不应该出现这种情况）
                Err(status::UNINITIALIZED) => continue,
                Err(_) => panic!("never run here"),
            }
            //这个finish用于判断是否在构造的时候panic掉了
            //panic时finish被drop，把状态设置成POISONED，
            //让等待的线程知道出事了，而不是永远自旋下去
            let finish = Finish {
                status: &self.status,
            };
            let f = match self.init.take() {
                Some(f) => f,
                //只有竞争成功的线程会走到这里，闭包一定还在
                None => panic!("never run here"),
            };
            unsafe { (*self.instance.get()).write(f()) };
            //正常结束，forget掉这个finish，不要把状态设置成POISONED
            core::mem::forget(finish);
            //将状态设置成INITIALIZED，Release保证实例的写入先于状态的发布
            self.status.store(INITIALIZED, Ordering::Release);
            return;
        }
    }

    #[inline]
    unsafe fn get_unchecked(&self) -> &T {
        (*self.instance.get()).assume_init_ref()
    }
}

impl<T, F> Drop for HolderSingleton<T, F> {
    fn drop(&mut self) {
        if self.status.load(Ordering::Acquire) == INITIALIZED {
            unsafe { (*self.instance.get()).assume_init_drop() }
        }
    }
}

struct Finish<'a> {
    status: &'a AtomicU8,
}

impl<'a> Drop for Finish<'a> {
    fn drop(&mut self) {
        self.status.store(POISONED, Ordering::SeqCst)
    }
}

#[cfg(test)]
pub mod test {
    extern crate std;
    use crate::holder::HolderSingleton;
    use std::sync::Arc;

    #[test]
    fn test() {
        let single = Arc::new(HolderSingleton::<i32>::new(|| 1));
        assert!(!single.is_initialized());
        assert!(single.get().is_none());

        let single_1 = single.clone();
        let single_2 = single.clone();
        let t1 = std::thread::spawn(move || single_1.get_instance() as *const i32 as usize);

        let t2 = std::thread::spawn(move || single_2.get_instance() as *const i32 as usize);

        let addr_1 = t1.join().expect("Err");
        let addr_2 = t2.join().expect("Err");
        assert_eq!(addr_1, addr_2);

        assert!(single.is_initialized());
        //get不触发初始化，此时返回的是同一个实例
        assert_eq!(single.get().expect("Err") as *const i32 as usize, addr_1)
    }

    #[test]
    fn poisoned_holder_panics_later() {
        let single = Arc::new(HolderSingleton::<i32, _>::new(|| panic!("boom")));
        let single_1 = single.clone();
        let t1 = std::thread::spawn(move || {
            let _ = single_1.get_instance();
        });
        //构造panic了
        assert!(t1.join().is_err());

        //之后的调用不会自旋等待，而是直接panic
        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = single.get_instance();
        }));
        assert!(caught.is_err())
    }
}
