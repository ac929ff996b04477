use qmx::analysis::structure_matching::{
    has_double_bond, has_hetero_bond, has_ring, has_triple_bond, is_aromatic,
};
use qmx::molecule::smiles;

#[test]
fn classifies_a_spread_of_qm9_like_molecules() {
    // (smiles, aromatic, double, triple, hetero, any ring)
    let cases = [
        ("C", false, false, false, false, false),
        ("CCO", false, false, false, true, false),
        ("C=C", false, true, false, false, false),
        ("C#C", false, false, true, false, false),
        ("CC(=O)N", false, true, false, true, false),
        ("N#CC=O", false, true, true, true, false),
        ("c1ccccc1", true, false, false, false, true),
        ("c1ccncc1", true, false, false, true, true),
        ("C1CC1", false, false, false, false, true),
        ("C1COC1", false, false, false, true, true),
    ];

    for (smi, aromatic, double, triple, hetero, ring) in cases {
        let mol = smiles::parse(smi).unwrap();
        assert_eq!(is_aromatic(&mol), aromatic, "aromatic flag for {}", smi);
        assert_eq!(has_double_bond(&mol), double, "double bond for {}", smi);
        assert_eq!(has_triple_bond(&mol), triple, "triple bond for {}", smi);
        assert_eq!(has_hetero_bond(&mol), hetero, "hetero bond for {}", smi);
        assert_eq!(has_ring(&mol, None), ring, "ring flag for {}", smi);
    }
}

#[test]
fn ring_size_queries_are_exact() {
    let cyclopentane = smiles::parse("C1CCCC1").unwrap();
    assert!(has_ring(&cyclopentane, Some(5)));
    assert!(!has_ring(&cyclopentane, Some(6)));
    assert!(has_ring(&cyclopentane, None));

    let oxetane = smiles::parse("C1COC1").unwrap();
    assert!(has_ring(&oxetane, Some(4)));
    assert!(!has_ring(&oxetane, Some(3)));
}

#[test]
fn fused_rings_report_both_sizes() {
    // Bicyclo[2.1.0]pentane: a three-ring fused to a four-ring.
    let mol = smiles::parse("C1CC2CC12").unwrap();
    assert!(has_ring(&mol, Some(3)));
    assert!(has_ring(&mol, Some(4)));
    assert!(!has_ring(&mol, Some(5)));
}

#[test]
fn bond_orders_outside_the_pattern_library_do_not_match() {
    // F carries no pattern; a C-F bond is not a hetero bond here.
    let mol = smiles::parse("CF").unwrap();
    assert!(!has_hetero_bond(&mol));
    assert!(!has_double_bond(&mol));
}
