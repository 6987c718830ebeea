use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use log::{error, info};

use canhuff::{dot_graph, encode_file_with_report};

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {program} [-h HUFFMAN_TREE_DOT] [-c CANONICAL_TREE_DOT] <source> <target>"
    );
    eprintln!("  <source>:  path to the text file to encode");
    eprintln!("  <target>:  path to write the binary output");
    eprintln!("  -h FILE:   also write the raw Huffman tree as a dot graph");
    eprintln!("  -c FILE:   also write the canonical tree as a dot graph");
    process::exit(1);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut huffman_dot: Option<PathBuf> = None;
    let mut canonical_dot: Option<PathBuf> = None;
    let mut files: Vec<&String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" => {
                i += 1;
                huffman_dot = Some(PathBuf::from(args.get(i).unwrap_or_else(|| usage(&args[0]))));
            }
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

    let report = match encode_file_with_report(source, target) {
        Ok(report) => report,
        Err(e) => {
            error!("Encoding failed: {e}");
            process::exit(1);
        }
    };

    if let Some(path) = huffman_dot {
        write_dot(&path, &dot_graph(&report.raw_tree));
    }
    if let Some(path) = canonical_dot {
        write_dot(&path, &dot_graph(&report.canonical_tree));
    }

    let ratio = if report.input_len > 0 {
        100.0 * (1.0 - (report.output_len as f64) / (report.input_len as f64))
    } else {
        0.0
    };

    println!(
        "Encoding successful.\n\
         input:    {} ({} bytes)\n\
         output:   {} ({} bytes)\n\
         entropy:  {:.4} bits/symbol\n\
         ratio:    {:.2}%",
        source.display(),
        report.input_len,
        target.display(),
        report.output_len,
        report.entropy,
        ratio
    );
}

fn write_dot(path: &Path, dot: &str) {
    if let Err(e) = fs::write(path, dot) {
        error!("Could not write dot graph to {}: {e}", path.display());
        process::exit(1);
    }
    info!("Wrote dot graph to {}", path.display());
}
