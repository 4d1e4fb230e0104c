//! Exercises the creator/attacher bootstrap race (§4.1) with many threads
//! calling `Space::open` on the same fresh name at once — one must win the
//! creation, the rest must attach to what the winner created, and every
//! attacher must observe the same ready, correctly-versioned region.

use memspace_core::Space;
use std::sync::Barrier;
use std::thread;

#[test]
fn concurrent_open_converges_on_one_region() {
    let name = format!("memspace_bootstrap_race_{}", std::process::id());
    const ATTACHERS: usize = 16;
    let barrier = Barrier::new(ATTACHERS);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..ATTACHERS)
            .map(|_| {
                let name = &name;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    Space::open(name, 256 * 1024).expect("open should succeed for every attacher")
                })
            })
            .collect();

        let spaces: Vec<Space> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for space in &spaces {
            assert_eq!(space.name(), name);
            assert_eq!(space.end_cursor(), memspace_core::DATA_START as u32);
        }

        let mut spaces = spaces;
        let last = spaces.pop().unwrap();
        for space in spaces {
            space.close();
        }
        last.unlink().unwrap();
    });
}
