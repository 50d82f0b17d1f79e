///
/// 饿汉式单例
/// 实例在包含它的static初始化的时候就构造好了，早于main，
/// 也早于任何可能的并发访问，所以不存在竞争窗口，天生线程安全
/// 代价是就算从来没有人用，实例也会被构造出来
/// # Example
/// ```
/// use xx_singleton::EagerSingleton;
///
/// static INSTANCE: EagerSingleton<i32> = EagerSingleton::new(3);
///
/// //实例在任何get_instance调用之前就已经存在
/// assert!(INSTANCE.is_initialized());
/// assert_eq!(*INSTANCE.get_instance(), 3);
/// ```
pub struct EagerSingleton<T> {
    instance: T,
}

impl<T> EagerSingleton<T> {
    ///构造发生在这里，也就是static初始化的时候
    pub const fn new(instance: T) -> Self {
        Self { instance }
    }

    ///饿汉式的状态机没有未初始化阶段，恒为真
    #[inline]
    pub fn is_initialized(&self) -> bool {
        true
    }

    ///纯访问器，没有分支也没有锁
    #[inline]
    pub fn get_instance(&self) -> &T {
        &self.instance
    }
}
