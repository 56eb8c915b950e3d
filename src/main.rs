/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use clap::Parser as clap_parser;
use riscasm::assemble;
use riscasm::file_reader::AsmFileReader;
use std::path::PathBuf;

#[derive(clap_parser)]
#[clap(version = "0.1.0", about = "Two-pass assembler for the 32-bit RISC teaching ISA")]
struct Opts {
    /// Assembly source files, each translated independently
    files: Vec<PathBuf>,
}

fn main() {
    let opts: Opts = Opts::parse();

    if opts.files.is_empty() {
        // the historical interface reports this on stderr and still exits 0
        eprintln!("Error: Missing input files.");
        return;
    }

    let reader = AsmFileReader;
    for file in &opts.files {
        // a failed unit never stops the remaining ones
        if let Err(err) = assemble(file, &reader) {
            eprintln!("Error: {:#}.", err);
        }
    }
}
