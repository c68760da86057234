mod cli;

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use flat_fs::{BLOCK_SIZE, Error, FlatFileSystem, TOTAL_BLOCKS};
use typed_bytesize::ByteSizeIec;

use self::cli::{Cli, Command};

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    log::debug!("image={:?}", cli.image);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> flat_fs::Result<()> {
    match cli.command {
        Command::Format => {
            let fs = FlatFileSystem::create(&cli.image)?;
            println!(
                "formatted {:?}: {} ({} blocks of {} bytes), {} blocks and {} inodes free",
                cli.image,
                ByteSizeIec((BLOCK_SIZE * TOTAL_BLOCKS) as u64),
                TOTAL_BLOCKS,
                BLOCK_SIZE,
                fs.super_block().free_blocks(),
                fs.super_block().free_inodes(),
            );
        }
        Command::Create { name, data, file } => {
            let data = match (data, file) {
                (Some(data), _) => data.into_bytes(),
                (None, Some(file)) => fs::read(file)?,
                (None, None) => {
                    let mut data = Vec::new();
                    io::stdin().read_to_end(&mut data)?;
                    data
                }
            };

            let mut fs = FlatFileSystem::load(&cli.image)?;
            let inode = fs.create_file(&name, &data)?;
            fs.close()?;
            println!("created {name:?}: inode {inode}, {} bytes", data.len());
        }
        Command::Read { name } => {
            let mut fs = FlatFileSystem::load(&cli.image)?;
            match fs.read_file(&name) {
                Ok(data) => {
                    println!("File: {name}, Size: {} bytes\nContent:", data.len());
                    let mut stdout = io::stdout().lock();
                    stdout.write_all(&data)?;
                    writeln!(stdout)?;
                }
                Err(Error::FileNotFound(name)) => println!("File not found: {name}"),
                Err(err) => return Err(err),
            }
            fs.close()?;
        }
        Command::List => {
            let fs = FlatFileSystem::load(&cli.image)?;
            for file in fs.list()? {
                println!(
                    "{:>4} {:>6} {:>10} {}",
                    file.inode, file.size, file.mtime, file.name
                );
            }
        }
        Command::Info => {
            let fs = FlatFileSystem::load(&cli.image)?;
            let super_block = fs.super_block();
            println!("image:  {:?}", cli.image);
            println!(
                "blocks: {}/{} free ({} bytes each)",
                super_block.free_blocks(),
                super_block.total_blocks(),
                BLOCK_SIZE
            );
            println!(
                "inodes: {}/{} free",
                super_block.free_inodes(),
                super_block.total_inodes()
            );
            if !super_block.check() {
                println!("warning: accounting does not match the bitmaps");
            }
        }
    }

    Ok(())
}
