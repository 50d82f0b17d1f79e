//100个线程抢同一个单例，所有人都应该拿到同一个实例
//racy（懒汉式）不在并发名单里：它的竞争是文档化的行为，
//在src/racy.rs的单元测试里单独演示

use xx_singleton::{
    DoubleCheckedSingleton, EagerSingleton, HolderSingleton, LockedSingleton, RacySingleton,
};

const THREADS: usize = 100;

fn race_addresses<F>(get_addr: F) -> Vec<usize>
where
    F: Fn() -> usize + Sync,
{
    crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS).map(|_| scope.spawn(|_| get_addr())).collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("Err"))
            .collect()
    })
    .expect("Err")
}

fn all_equal(addrs: &[usize]) -> bool {
    addrs.iter().all(|&addr| addr == addrs[0])
}

#[test]
fn holder_is_unique_under_contention() {
    let single: HolderSingleton<u64> = HolderSingleton::new(|| 7);
    let addrs = race_addresses(|| single.get_instance() as *const u64 as usize);
    assert_eq!(addrs.len(), THREADS);
    assert!(all_equal(&addrs));
}

#[test]
fn locked_is_unique_under_contention() {
    let single: LockedSingleton<u64> = LockedSingleton::new(|| 7);
    let addrs = race_addresses(|| single.get_instance() as *const u64 as usize);
    assert!(all_equal(&addrs));
    //每一次调用都要拿一次锁，初始化之后也一样
    assert_eq!(single.lock_acquisitions(), THREADS);
}

#[test]
fn double_checked_is_unique_under_contention() {
    let single: DoubleCheckedSingleton<u64> = DoubleCheckedSingleton::new(|| 7);
    let addrs = race_addresses(|| single.get_instance() as *const u64 as usize);
    assert!(all_equal(&addrs));
}

static EAGER: EagerSingleton<u64> = EagerSingleton::new(7);

#[test]
fn eager_is_unique_under_contention() {
    //实例在进程启动时就已经存在
    assert!(EAGER.is_initialized());
    let addrs = race_addresses(|| EAGER.get_instance() as *const u64 as usize);
    assert!(all_equal(&addrs));
}

//初始化完成之后，再怎么调用拿到的都是同一个引用
#[test]
fn repeated_calls_are_idempotent() {
    let racy: RacySingleton<u64> = RacySingleton::new(|| 7);
    let holder: HolderSingleton<u64> = HolderSingleton::new(|| 7);
    let locked: LockedSingleton<u64> = LockedSingleton::new(|| 7);
    let double_checked: DoubleCheckedSingleton<u64> = DoubleCheckedSingleton::new(|| 7);

    let first = [
        racy.get_instance() as *const u64 as usize,
        holder.get_instance() as *const u64 as usize,
        locked.get_instance() as *const u64 as usize,
        double_checked.get_instance() as *const u64 as usize,
        EAGER.get_instance() as *const u64 as usize,
    ];

    for _ in 0..10 {
        let again = [
            racy.get_instance() as *const u64 as usize,
            holder.get_instance() as *const u64 as usize,
            locked.get_instance() as *const u64 as usize,
            double_checked.get_instance() as *const u64 as usize,
            EAGER.get_instance() as *const u64 as usize,
        ];
        assert_eq!(first, again);
    }
}
