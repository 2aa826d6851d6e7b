use orcaprep::parser::{parse_descriptor, ParseError};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn write_descriptor(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut file = File::create(&path).unwrap();
    write!(file, "{}", content).unwrap();
    path
}

#[test]
fn test_parse_pal_block_descriptor() {
    let input = "\
! B3LYP def2-TZVP TightSCF
%pal nprocs 8 end
* xyzfile -2 1 ZnHis4_clean.xyz
";
    let path = write_descriptor("orcaprep_block.in", input);

    let descriptor = parse_descriptor(&path).unwrap();
    assert_eq!(descriptor.nprocs, 8);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_parse_inline_pal_descriptor() {
    let path = write_descriptor("orcaprep_inline.in", "! PAL4 B3LYP def2-SVP\n");

    let descriptor = parse_descriptor(&path).unwrap();
    assert_eq!(descriptor.nprocs, 4);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_parse_plain_descriptor_defaults_to_one() {
    let input = "\
! B3LYP def2-SVP
* xyz 0 1
Zn 0.0 0.0 0.0
*
";
    let path = write_descriptor("orcaprep_plain.in", input);

    let descriptor = parse_descriptor(&path).unwrap();
    assert_eq!(descriptor.nprocs, 1);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_parse_multiline_pal_block() {
    let input = "\
%pal
  nprocs 16
end
! B3LYP
";
    let path = write_descriptor("orcaprep_multiline.in", input);

    let descriptor = parse_descriptor(&path).unwrap();
    assert_eq!(descriptor.nprocs, 16);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_descriptor_reports_not_a_file() {
    let path = std::env::temp_dir().join("orcaprep_no_such_file.in");
    let err = parse_descriptor(&path).unwrap_err();
    assert!(matches!(err, ParseError::NotAFile(_)));
}
