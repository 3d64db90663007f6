//! Small inspector exercising the public `pexp` API end to end: load a
//! file, print its bitness/machine/subsystem/entry point, and optionally
//! the section table and a handful of data directories.

use std::process::ExitCode;

use clap::Parser;
use pexp::Image;

#[derive(Debug, Parser)]
#[command(name = "pexp-dump", about = "Inspect a Portable Executable file")]
struct Args {
    /// Path to the PE file to inspect.
    path: std::path::PathBuf,

    /// Print the section header table.
    #[arg(long)]
    sections: bool,

    /// Print which data directories are present.
    #[arg(long)]
    directories: bool,

    /// Print imported DLLs and functions.
    #[arg(long)]
    imports: bool,

    /// Print exported functions.
    #[arg(long)]
    exports: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pexp-dump: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> pexp::Result<()> {
    let image = Image::open(&args.path)?;

    let optional_header = image.optional_header()?;
    let file_header = image.file_header()?;

    println!("{}", args.path.display());
    println!(
        "  bitness:     {}",
        if image.is_64bit()? { "PE32+" } else { "PE32" }
    );
    println!("  machine:     {:?}", file_header.machine()?);
    println!("  subsystem:   {:?}", optional_header.subsystem()?);
    println!(
        "  entry point: {:#010x}",
        optional_header.address_of_entry_point()?
    );
    println!(
        "  image type:  {}",
        match (image.is_exe()?, image.is_dll()?) {
            (_, true) => "DLL",
            (true, _) => "EXE",
            _ => "unknown",
        }
    );

    if args.sections {
        println!("sections:");
        for section in image.sections()? {
            println!(
                "  {:<9} va={:#010x} vsize={:#010x} raw={:#010x}/{:#010x}",
                section.name()?,
                section.virtual_address()?,
                section.virtual_size()?,
                section.pointer_to_raw_data()?,
                section.size_of_raw_data()?,
            );
        }
    }

    if args.directories {
        println!("data directories:");
        for kind in pexp::enums::data_directory_kind::DATA_DIRECTORY_KINDS {
            let entry = optional_header.data_directory().entry(kind);
            if entry.is_present()? {
                println!(
                    "  {:?}: rva={:#010x} size={:#010x}",
                    kind,
                    entry.virtual_address()?,
                    entry.size()?
                );
            }
        }
    }

    if args.imports {
        println!("imports:");
        for descriptor in image.import_descriptors()? {
            println!("  {}", descriptor.dll_name()?);
            for function in descriptor.functions()? {
                if function.name.is_empty() {
                    println!("    ordinal #{}", function.ordinal);
                } else {
                    println!("    {}", function.name);
                }
            }
        }
    }

    if args.exports {
        if let Some(export_directory) = image.export_directory()? {
            println!("exports ({}):", export_directory.name()?);
            for function in export_directory.functions()? {
                match &function.forwarded_name {
                    Some(target) => println!("  {} -> {}", function.name, target),
                    None => println!("  {} @ {:#010x}", function.name, function.rva),
                }
            }
        } else {
            println!("exports: none");
        }
    }

    Ok(())
}
