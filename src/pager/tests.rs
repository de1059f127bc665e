use std::fs::remove_file;

use disk::{make_name, Disk};
use page_table::{FaultHandler, PageTable, VirtualMemory};
use serial_test::serial;

use super::{Pager, PagerError, Stats};
use crate::{
    build,
    policy::{Policy, PolicyKind},
};

const PAGE_SIZE: usize = 16;

type Vm = VirtualMemory<Pager<PAGE_SIZE>, PAGE_SIZE>;

fn setup_seeded(name: &str, npages: usize, nframes: usize, kind: PolicyKind, seed: u64) -> Vm {
    let disk = Disk::create(name, npages).unwrap();
    let table = PageTable::create(npages, nframes).unwrap();
    let pager = Pager::new(disk, npages, nframes, Policy::new(kind, nframes, seed)).unwrap();
    VirtualMemory::new(table, pager)
}

fn setup(name: &str, npages: usize, nframes: usize, kind: PolicyKind) -> Vm {
    setup_seeded(name, npages, nframes, kind, 1)
}

fn cleanup(name: &str) {
    let _ = remove_file(make_name(name));
}

fn touch(vm: &mut Vm, pages: &[usize]) {
    for &page in pages {
        vm.read_u8((page * PAGE_SIZE) as u64).unwrap();
    }
}

/// Page table and frame table describe the same set of resident pages.
fn assert_consistent(vm: &Vm) {
    let mut from_table: Vec<(usize, usize)> = vm.table().resident().collect();
    let mut from_frames: Vec<(usize, usize)> = vm
        .handler()
        .frames()
        .occupied()
        .map(|(frame, page)| (page, frame))
        .collect();
    from_table.sort_unstable();
    from_frames.sort_unstable();
    assert_eq!(from_table, from_frames);
    for &(page, frame) in &from_table {
        assert_eq!(vm.handler().frames().frame_of(page), Some(frame));
    }
}

fn final_frames(vm: &Vm) -> Vec<(usize, usize)> {
    vm.handler().frames().occupied().collect()
}

#[test]
#[serial]
fn clock_sequence() {
    let name = "pager_clock_sequence";
    let mut vm = setup(name, 4, 2, PolicyKind::Clock);
    touch(&mut vm, &[0, 1, 2, 0, 3]);
    assert_eq!(
        vm.handler().stats(),
        Stats {
            page_faults: 5,
            disk_reads: 5,
            disk_writes: 0
        }
    );
    assert_eq!(final_frames(&vm), vec![(0, 3), (1, 0)]);
    match vm.handler().policy() {
        Policy::Clock(clock) => {
            assert_eq!(clock.hand(), 1);
            assert!(clock.reference_bit(0));
            assert!(!clock.reference_bit(1));
        }
        other => panic!("unexpected policy {:?}", other.kind()),
    }
    cleanup(name);
}

#[test]
#[serial]
fn custom_sequence() {
    let name = "pager_custom_sequence";
    let mut vm = setup(name, 4, 2, PolicyKind::Custom);
    touch(&mut vm, &[0, 1, 2, 0, 3]);
    assert_eq!(
        vm.handler().stats(),
        Stats {
            page_faults: 5,
            disk_reads: 5,
            disk_writes: 0
        }
    );
    assert_eq!(final_frames(&vm), vec![(0, 3), (1, 0)]);
    match vm.handler().policy() {
        Policy::Custom(ages) => {
            assert_eq!(ages.ticks(), 5);
            assert_eq!(ages.age(0), 5);
            assert_eq!(ages.age(1), 4);
        }
        other => panic!("unexpected policy {:?}", other.kind()),
    }
    cleanup(name);
}

#[test]
#[serial]
fn custom_ignores_hits() {
    let name = "pager_custom_ignores_hits";
    let mut vm = setup(name, 4, 2, PolicyKind::Custom);
    // Page 0 is touched constantly but was loaded first, so it goes first.
    touch(&mut vm, &[0, 1, 0, 0, 0, 2]);
    assert_eq!(vm.handler().stats().page_faults, 3);
    assert_eq!(vm.handler().frames().frame_of(0), None);
    assert_eq!(final_frames(&vm), vec![(0, 2), (1, 1)]);
    cleanup(name);
}

#[test]
#[serial]
fn random_sequence_is_bounded() {
    let name = "pager_random_sequence_is_bounded";
    for seed in 0..20 {
        let mut vm = setup_seeded(name, 4, 2, PolicyKind::Random, seed);
        touch(&mut vm, &[0, 1, 2, 0, 3]);
        let stats = vm.handler().stats();
        assert!((4..=5).contains(&stats.page_faults), "seed {}: {:?}", seed, stats);
        assert_eq!(stats.disk_reads, stats.page_faults);
        assert_eq!(stats.disk_writes, 0);
        assert_consistent(&vm);
    }
    cleanup(name);
}

#[test]
#[serial]
fn tables_agree_after_every_access() {
    for kind in [PolicyKind::Random, PolicyKind::Clock, PolicyKind::Custom] {
        let name = format!("pager_tables_agree_{}", kind);
        let mut vm = setup(&name, 8, 3, kind);
        assert_consistent(&vm);
        for step in 0..300u64 {
            let page = (step * 7 + step / 5) % 8;
            let address = page * PAGE_SIZE as u64 + step % PAGE_SIZE as u64;
            if step % 3 == 0 {
                vm.write_u8(address, step as u8).unwrap();
            } else {
                vm.read_u8(address).unwrap();
            }
            assert_consistent(&vm);
            let stats = vm.handler().stats();
            assert_eq!(stats.page_faults, stats.disk_reads);
            assert!(stats.disk_writes <= stats.page_faults);
        }
        assert_eq!(vm.table().resident().count(), 3);
        cleanup(&name);
    }
}

#[test]
#[serial]
fn dirty_pages_survive_eviction() {
    for kind in [PolicyKind::Random, PolicyKind::Clock, PolicyKind::Custom] {
        let name = format!("pager_dirty_pages_survive_{}", kind);
        let mut vm = setup(&name, 6, 2, kind);
        for page in 0..6u64 {
            for offset in 0..PAGE_SIZE as u64 {
                vm.write_u8(page * PAGE_SIZE as u64 + offset, (page * 10 + offset) as u8)
                    .unwrap();
            }
        }
        let writes_after_fill = vm.handler().stats().disk_writes;
        assert_eq!(writes_after_fill, 4);

        for page in (0..6u64).rev() {
            for offset in 0..PAGE_SIZE as u64 {
                assert_eq!(
                    vm.read_u8(page * PAGE_SIZE as u64 + offset).unwrap(),
                    (page * 10 + offset) as u8,
                    "{}: page {} offset {}",
                    kind,
                    page,
                    offset
                );
            }
        }
        let stats = vm.handler().stats();
        assert_eq!(stats.page_faults, stats.disk_reads);
        assert!(stats.disk_writes <= stats.page_faults);
        cleanup(&name);
    }
}

#[test]
#[serial]
fn clean_pages_are_not_written_back() {
    let name = "pager_clean_pages_are_not_written_back";
    let mut vm = setup(name, 4, 1, PolicyKind::Clock);
    vm.write_u8(0, 1).unwrap();
    touch(&mut vm, &[1, 2, 3]);
    // Only page 0 was ever modified.
    assert_eq!(vm.handler().stats().disk_writes, 1);
    cleanup(name);
}

#[test]
#[serial]
fn fault_on_present_page_is_fatal() {
    let name = "pager_fault_on_present_page_is_fatal";
    let mut vm = setup(name, 4, 2, PolicyKind::Clock);
    touch(&mut vm, &[2]);
    let (table, pager) = vm.parts_mut();
    assert_eq!(
        pager.page_fault(table, 2),
        Err(PagerError::AlreadyPresent { page: 2 })
    );
    let stats = vm.handler().stats();
    assert_eq!(stats.page_faults, 2);
    assert_eq!(stats.disk_reads, 1);
    assert_consistent(&vm);
    cleanup(name);
}

#[test]
#[serial]
fn fault_outside_address_space() {
    let name = "pager_fault_outside_address_space";
    let mut vm = setup(name, 4, 2, PolicyKind::Custom);
    let (table, pager) = vm.parts_mut();
    assert_eq!(pager.page_fault(table, 4), Err(PagerError::PageOutOfRange(4)));
    cleanup(name);
}

#[test]
#[serial]
fn custom_evicts_oldest_and_restamps() {
    let name = "pager_custom_evicts_oldest";
    let mut vm = setup(name, 10, 4, PolicyKind::Custom);
    for step in 0..200usize {
        let page = (step * step + 3 * step) % 10;
        let full = vm.handler().frames().find_free().is_none();
        let resident = vm.handler().frames().frame_of(page).is_some();
        let before = match vm.handler().policy() {
            Policy::Custom(ages) => ages.clone(),
            _ => unreachable!(),
        };

        touch(&mut vm, &[page]);

        if full && !resident {
            let expected = vm
                .handler()
                .frames()
                .occupied()
                .map(|(frame, _)| frame)
                .min_by_key(|&frame| before.age(frame))
                .unwrap();
            assert_eq!(expected, before.select_victim());
            assert_eq!(vm.handler().frames().frame_of(page), Some(expected));
            match vm.handler().policy() {
                Policy::Custom(ages) => assert_eq!(ages.age(expected), before.ticks() + 1),
                _ => unreachable!(),
            }
        }
    }
    cleanup(name);
}

#[test]
#[serial]
fn clock_marks_loaded_frames() {
    let name = "pager_clock_marks_loaded_frames";
    let mut vm = setup(name, 6, 3, PolicyKind::Clock);
    for page in [0, 1, 2, 3, 4, 0, 5, 1] {
        touch(&mut vm, &[page]);
        let frame = vm.handler().frames().frame_of(page).unwrap();
        match vm.handler().policy() {
            Policy::Clock(clock) => assert!(clock.reference_bit(frame)),
            _ => unreachable!(),
        }
    }
    cleanup(name);
}

#[test]
#[serial]
fn deterministic_policies_replay_identically() {
    let pattern: Vec<usize> = (0..120).map(|i| (i * 5 + i / 7) % 9).collect();
    for kind in [PolicyKind::Clock, PolicyKind::Custom] {
        let name = format!("pager_replay_{}", kind);
        let mut runs = Vec::new();
        for _ in 0..2 {
            let mut vm = setup(&name, 9, 4, kind);
            for (i, &page) in pattern.iter().enumerate() {
                let address = (page * PAGE_SIZE) as u64;
                if i % 4 == 0 {
                    vm.write_u8(address, i as u8).unwrap();
                } else {
                    vm.read_u8(address).unwrap();
                }
            }
            runs.push((vm.handler().stats(), final_frames(&vm)));
        }
        assert_eq!(runs[0], runs[1], "{}", kind);
        cleanup(&name);
    }
}

#[test]
#[serial]
fn flush_writes_dirty_pages_once() {
    let name = "pager_flush_writes_dirty_pages_once";
    let mut vm = setup(name, 4, 2, PolicyKind::Clock);
    vm.write_u8(PAGE_SIZE as u64 + 3, 0x42).unwrap();
    touch(&mut vm, &[0]);

    let (table, pager) = vm.parts_mut();
    pager.flush(table).unwrap();
    pager.flush(table).unwrap();
    assert_eq!(vm.handler().stats().disk_writes, 1);
    assert!(!vm.table().get_entry(1).unwrap().is_dirty());
    assert!(vm.table().get_entry(1).unwrap().is_present());

    let (_, pager) = vm.into_parts();
    let mut disk = pager.into_disk();
    let mut block = [0; PAGE_SIZE];
    disk.read_block(1, &mut block).unwrap();
    assert_eq!(block[3], 0x42);
    cleanup(name);
}

#[test]
#[serial]
fn rejects_bad_geometry() {
    let name = "pager_rejects_bad_geometry";
    let small = Disk::<PAGE_SIZE>::create(name, 2).unwrap();
    assert!(matches!(
        Pager::new(small, 4, 2, Policy::new(PolicyKind::Clock, 2, 1)),
        Err(PagerError::Config(_))
    ));
    let disk = Disk::<PAGE_SIZE>::create(name, 4).unwrap();
    assert!(matches!(
        Pager::new(disk, 4, 2, Policy::new(PolicyKind::Custom, 3, 1)),
        Err(PagerError::Config(_))
    ));
    let disk = Disk::<PAGE_SIZE>::create(name, 4).unwrap();
    assert!(matches!(
        Pager::new(disk, 4, 0, Policy::new(PolicyKind::Random, 0, 1)),
        Err(PagerError::Config(_))
    ));
    cleanup(name);
}

#[test]
#[serial]
fn evicting_a_free_frame_is_reported() {
    let name = "pager_evicting_a_free_frame_is_reported";
    let mut vm = setup(name, 4, 2, PolicyKind::Clock);
    touch(&mut vm, &[3]);
    let (table, pager) = vm.parts_mut();
    assert_eq!(pager.evict(table, 1), Err(PagerError::EmptyVictim { frame: 1 }));
    assert_consistent(&vm);
    cleanup(name);
}

#[test]
#[serial]
fn oversized_frame_pool_is_a_config_error() {
    let name = "pager_oversized_frame_pool";
    let disk = Disk::<PAGE_SIZE>::create(name, 2).unwrap();
    let nframes = usize::MAX / PAGE_SIZE + 1;
    assert!(matches!(
        build(disk, 2, nframes, PolicyKind::Clock, 1),
        Err(PagerError::Config(_))
    ));
    cleanup(name);
}
