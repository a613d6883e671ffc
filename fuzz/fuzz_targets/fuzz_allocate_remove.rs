#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sector_chain::DiskBuilder;

#[derive(Arbitrary, Debug)]
enum Operation {
    Allocate {
        name: u8,
        content: String,
        preferred: Option<u8>,
    },
    Remove {
        id: u8,
    },
    Reset {
        total_sectors: u8,
        sector_size: u8,
    },
}

#[derive(Arbitrary, Debug)]
struct Input {
    total_sectors: u8,
    sector_size: u8,
    operations: Vec<Operation>,
}

fuzz_target!(|input: Input| {
    let Ok(mut disk) = DiskBuilder::new()
        .total_sectors(input.total_sectors as usize)
        .sector_size(input.sector_size as usize)
        .build()
    else {
        return;
    };

    for op in input.operations {
        let before = disk.view();
        let failed = match op {
            Operation::Allocate {
                name,
                content,
                preferred,
            } => disk
                .allocate(&format!("f{}", name), &content, preferred.map(usize::from))
                .is_err(),
            Operation::Remove { id } => disk.remove(u64::from(id)).is_err(),
            Operation::Reset {
                total_sectors,
                sector_size,
            } => disk
                .init(total_sectors as usize, sector_size as usize)
                .is_err(),
        };

        if failed {
            assert_eq!(disk.view(), before);
        }
        disk.verify().unwrap();
    }
});
