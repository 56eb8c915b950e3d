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

use riscasm::assemble;
use riscasm::file_reader::{AsmFileReader, MockFileReader};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes the source into a temp dir and assembles it with the production
/// reader, so the emitted files land beside it.
fn assemble_in_temp_dir(source: &str) -> (TempDir, PathBuf, bool) {
    let dir = TempDir::new().unwrap();
    let source_path = dir.path().join("prog.asm");
    fs::write(&source_path, source).unwrap();
    let produced = assemble(&source_path, &AsmFileReader).unwrap();
    (dir, source_path, produced)
}

fn read(path: &Path, extension: &str) -> String {
    fs::read_to_string(path.with_extension(extension)).unwrap()
}

#[test]
fn test_code_only_object_file() {
    let (_dir, path, produced) = assemble_in_temp_dir("main: add $1, $2, $3\nstop\n");
    assert!(produced);
    assert_eq!(read(&path, "ob"), "8 0\n0100 40 18 22 00\n0104 00 00 00 FC\n");
    // no attributes, so neither side file appears
    assert!(!path.with_extension("ext").exists());
    assert!(!path.with_extension("ent").exists());
}

#[test]
fn test_data_and_entry_files() {
    let (_dir, path, produced) = assemble_in_temp_dir("x: .dw 5, -1\n.entry x\n");
    assert!(produced);
    assert_eq!(read(&path, "ob"), "0 8\n0100 05 00 00 00\n0104 FF FF FF FF\n");
    assert_eq!(read(&path, "ent"), "x 0100\n");
    // the pair is created together even though no external is referenced
    assert_eq!(read(&path, "ext"), "");
}

#[test]
fn test_external_reference() {
    let (_dir, path, produced) = assemble_in_temp_dir(".extern foo\nla foo\nstop\n");
    assert!(produced);
    assert_eq!(read(&path, "ob"), "8 0\n0100 00 00 00 7C\n0104 00 00 00 FC\n");
    assert_eq!(read(&path, "ext"), "foo 0100\n");
    assert_eq!(read(&path, "ent"), "");
}

#[test]
fn test_self_branch() {
    let (_dir, path, produced) = assemble_in_temp_dir("loop: beq $1, $2, loop\nstop\n");
    assert!(produced);
    assert_eq!(read(&path, "ob"), "8 0\n0100 00 00 22 40\n0104 00 00 00 FC\n");
}

#[test]
fn test_asciz_bytes() {
    let (_dir, path, produced) = assemble_in_temp_dir("str: .asciz \"Hi\"\n");
    assert!(produced);
    assert_eq!(read(&path, "ob"), "0 3\n0100 48 69 00\n");
}

#[test]
fn test_error_suppresses_all_output() {
    let (_dir, path, produced) = assemble_in_temp_dir("lbl: .db 200\n");
    assert!(!produced);
    assert!(!path.with_extension("ob").exists());
    assert!(!path.with_extension("ext").exists());
    assert!(!path.with_extension("ent").exists());
}

#[test]
fn test_second_pass_error_suppresses_output() {
    let (_dir, path, produced) = assemble_in_temp_dir("jmp nowhere\nstop\n");
    assert!(!produced);
    assert!(!path.with_extension("ob").exists());
}

#[test]
fn test_larger_program_round_trip() {
    let source = "\
; sums the data words and loops forever
.entry main
.extern printnum
main: la nums
move $9, $4
addi $2, 1, $2
loop: bne $2, $0, done
call printnum
jmp loop
done: stop
nums: .dh 1, -1, 512
flag: .db 1
msg: .asciz \"end\"
";
    let (_dir, path, produced) = assemble_in_temp_dir(source);
    assert!(produced);

    let object = read(&path, "ob");
    let mut lines = object.lines();
    // 7 instructions, then 6 + 1 + 4 data bytes
    assert_eq!(lines.next(), Some("28 11"));
    assert_eq!(object.lines().count(), 1 + 7 + 3);
    // data image: 1, -1, 512 halves, the flag byte, then "end\0"
    assert!(object.contains("0128 01 00 FF FF"));
    assert!(object.contains("0132 00 02 01 65"));
    assert!(object.contains("0136 6E 64 00"));

    assert_eq!(read(&path, "ext"), "printnum 0116\n");
    assert_eq!(read(&path, "ent"), "main 0100\n");
}

#[test]
fn test_multiple_errors_reported_without_files() {
    let mut reader = MockFileReader::default();
    reader.add_file("bad.asm", "add $1, $2\nmvlo $1, $40\n.dh 70000\n");
    let produced = assemble(Path::new("bad.asm"), &reader).unwrap();
    assert!(!produced);
}

#[test]
fn test_missing_input_file() {
    let reader = MockFileReader::default();
    assert!(assemble(Path::new("absent.asm"), &reader).is_err());
}
