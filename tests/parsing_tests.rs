use std::fs;
use std::path::PathBuf;

use qmx::error::Error;
use qmx::molecule::Element;
use qmx::parsing::electronic::read_electronic_properties;
use qmx::parsing::xyz::read_xyz;
use qmx::schema::DEFAULT_ELECTRONIC_COLUMNS;
use tempdir::TempDir;

const METHANE_XYZ: &str = "\
5
gdb 1\t157.7118\t157.70997\t157.70699\t0.\t13.21\t-0.3877\t0.1171\t0.5048\t35.3641\t0.044749\t-40.47893\t-40.476062\t-40.475117\t-40.498597\t6.469
C\t-0.0126981359\t1.0858041578\t0.0080009958\t-0.535689
H\t0.002150416\t-0.0060313176\t0.0019761204\t0.133921
H\t1.0117308433\t1.4637511618\t0.0002765748\t0.133922
H\t-0.540815069\t1.4475266138\t-0.8766437152\t0.133923
H\t-0.5238136345\t1.4379326443\t0.9063972942\t0.133923
1341.307\t1341.3284\t1341.365
C\tC
InChI=1S/CH4/h1H4\tInChI=1S/CH4/h1H4
";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn reads_a_methane_file() {
    let dir = TempDir::new("qmx-parsing").unwrap();
    let path = write_file(&dir, "dsgdb9nsd_000001.xyz", METHANE_XYZ);

    let record = read_xyz(&path, true, None).unwrap();
    assert_eq!(record.qmx_id, 1);
    assert_eq!(record.smiles, "C");
    assert_eq!(record.elements.len(), 5);
    assert_eq!(record.elements[0], Element::C);
    assert_eq!(record.xyz.len(), 5);
    assert_eq!(record.properties.len(), 15);
    assert_eq!(record.properties[0], 157.7118);
    assert_eq!(record.heavy_atom_count(), 1);
    assert!(!record.zwitter);
}

#[test]
fn selects_scalar_property_subset() {
    let dir = TempDir::new("qmx-parsing").unwrap();
    let path = write_file(&dir, "methane.xyz", METHANE_XYZ);

    let record = read_xyz(&path, true, Some(&[0, 1, 2])).unwrap();
    assert_eq!(record.properties, vec![157.7118, 157.70997, 157.70699]);
}

#[test]
fn normalizes_broken_exponent_markers() {
    let contents = "\
1
gdb 9 1.0 2.0 3.0
C 1.6991*^-6 5.*^-7 0.0 0.0
100.0
C C
";
    let dir = TempDir::new("qmx-parsing").unwrap();
    let path = write_file(&dir, "exp.xyz", contents);

    let record = read_xyz(&path, true, None).unwrap();
    assert_eq!(record.xyz[0][0], 1.6991e-6);
    assert_eq!(record.xyz[0][1], 5e-7);
}

#[test]
fn atom_count_mismatch_is_a_malformed_record() {
    // Declares 3 atoms but holds only 2 coordinate lines; the parser runs
    // into the frequency line instead of a third atom.
    let contents = "\
3
gdb 2 1.0 2.0 3.0
C 0.0 0.0 0.0
H 1.0 0.0 0.0
100.0 200.0
C C
";
    let dir = TempDir::new("qmx-parsing").unwrap();
    let path = write_file(&dir, "short.xyz", contents);

    let err = read_xyz(&path, true, None).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { .. }));
}

#[test]
fn truncated_file_is_a_malformed_record() {
    let contents = "\
4
gdb 3 1.0
C 0.0 0.0 0.0
";
    let dir = TempDir::new("qmx-parsing").unwrap();
    let path = write_file(&dir, "truncated.xyz", contents);

    assert!(read_xyz(&path, true, None).is_err());
}

#[test]
fn zwitterion_flag_comes_from_the_first_notation_string() {
    let contents = "\
2
gdb 4 1.0 2.0
N 0.0 0.0 0.0
C 1.0 0.0 0.0
100.0
[NH3+]C[O-] CN
";
    let dir = TempDir::new("qmx-parsing").unwrap();
    let path = write_file(&dir, "zwitter.xyz", contents);

    let record = read_xyz(&path, true, None).unwrap();
    assert!(record.zwitter);
    // Canonical selection takes the second string.
    assert_eq!(record.smiles, "CN");

    let plain = read_xyz(&path, false, None).unwrap();
    assert_eq!(plain.smiles, "[NH3+]C[O-]");
}

#[test]
fn electronic_property_table_skips_comments_and_selects_columns() {
    let mut contents = String::from("# column descriptions\n# more header text\n");
    for id in [1, 2] {
        let cols: Vec<String> = (0..16).map(|c| format!("{}.{}", id, c)).collect();
        contents.push_str(&format!("{} {}\n", id, cols.join(" ")));
    }

    let dir = TempDir::new("qmx-parsing").unwrap();
    let path = write_file(&dir, "qm8.txt", &contents);

    let table = read_electronic_properties(&path, &DEFAULT_ELECTRONIC_COLUMNS).unwrap();
    assert_eq!(table.len(), 2);
    // Column 16 does not exist in a 16-column table; the selection yields
    // the four columns that do.
    assert_eq!(table[&1], vec![1.0, 1.13, 1.14, 1.15]);
}

#[test]
fn unparsable_electronic_column_is_a_malformed_record() {
    let dir = TempDir::new("qmx-parsing").unwrap();
    let path = write_file(&dir, "bad.txt", "# header\n1 not-a-float\n");

    let err = read_electronic_properties(&path, &[0]).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { .. }));
}
