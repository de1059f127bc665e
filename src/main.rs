//! Usage: virtmem <npages> <nframes> <rand|clock|custom> <alpha|beta|gamma|delta>
//!
//! Runs the chosen program over `npages` pages of virtual memory backed by
//! `nframes` physical frames and prints the fault and disk counters.

use std::{env, process};

use anyhow::{Context, Result};
use disk::Disk;
use log::debug;
use virtmem::{build, Args, ConfigError, DISK_NAME, PAGE_SIZE};

fn main() {
    env_logger::init();

    let argv: Vec<String> = env::args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("virtmem");
    let seed = env::var(Args::SEED_VAR).ok();

    let args = match Args::parse(&argv, seed.as_deref()) {
        Ok(args) => args,
        Err(ConfigError::Usage) => {
            Args::usage(program);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let npages = args.number_of_pages();
    let nframes = args.number_of_frames();

    let disk = Disk::<PAGE_SIZE>::create(DISK_NAME, npages)
        .context("couldn't create virtual disk")?;
    let mut vm = build(disk, npages, nframes, args.policy(), args.seed())
        .context("couldn't create page table")?;
    debug!(
        "{} pages, {} frames, {} replacement, seed {}",
        npages,
        nframes,
        args.policy(),
        args.seed()
    );

    let workload = args.workload();
    let result = workload
        .run(&mut vm)
        .with_context(|| format!("{} aborted", workload))?;
    println!("{}: result is {}", workload, result);
    println!("{}", vm.handler().stats());
    Ok(())
}
