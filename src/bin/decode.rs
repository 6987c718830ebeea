use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use log::{error, info};

use canhuff::{decode_file, dot_graph};

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [-c CANONICAL_TREE_DOT] <source> <target>");
    eprintln!("  <source>:  path to the encoded binary file");
    eprintln!("  <target>:  path to write the decoded text");
    eprintln!("  -c FILE:   also write the canonical tree as a dot graph");
    process::exit(1);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut canonical_dot: Option<PathBuf> = None;
    let mut files: Vec<&String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" => {
                i += 1;
                canonical_dot =
                    Some(PathBuf::from(args.get(i).unwrap_or_else(|| usage(&args[0]))));
            }
            _ => files.push(&args[i]),
        }
        i += 1;
    }
    if files.len() != 2 {
        usage(&args[0]);
    }
    let source = Path::new(files[0]);
    let target = Path::new(files[1]);

    let tree = match decode_file(source, target) {
        Ok(tree) => tree,
        Err(e) => {
            error!("Decoding failed: {e}");
            process::exit(1);
        }
    };

    if let Some(path) = canonical_dot {
        if let Err(e) = fs::write(&path, dot_graph(&tree)) {
            error!("Could not write dot graph to {}: {e}", path.display());
            process::exit(1);
        }
        info!("Wrote dot graph to {}", path.display());
    }

    let input_size = fs::metadata(source).map(|m| m.len()).unwrap_or(0);
    let output_size = fs::metadata(target).map(|m| m.len()).unwrap_or(0);

    println!(
        "Decoding successful.\n\
         input:   {} ({} bytes)\n\
         output:  {} ({} bytes)",
        source.display(),
        input_size,
        target.display(),
        output_size
    );
}
