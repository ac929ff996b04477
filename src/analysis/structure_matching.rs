//! Structural classification against a small fixed pattern library. The
//! patterns are restricted to the bond chemistry that actually occurs in
//! the QM9 corpus: double bonds among C/N/O, triple bonds among C/N, and
//! wildcard-order hetero bonds among C/N/O.

use crate::molecule::{Bond, BondOrder, Element, Molecule};

/// One two-atom bond pattern; `order` of `None` is a wildcard matching any
/// bond order. Element order within the pattern is not significant.
#[derive(Debug, Clone, Copy)]
pub struct BondPattern {
    pub a: Element,
    pub b: Element,
    pub order: Option<BondOrder>,
}

impl BondPattern {
    const fn new(a: Element, b: Element, order: Option<BondOrder>) -> Self {
        BondPattern { a, b, order }
    }

    fn matches(&self, bond: &Bond, mol: &Molecule) -> bool {
        if let Some(order) = self.order {
            if bond.order != order {
                return false;
            }
        }
        let ea = mol.atoms()[bond.a].element;
        let eb = mol.atoms()[bond.b].element;
        (ea, eb) == (self.a, self.b) || (eb, ea) == (self.a, self.b)
    }
}

lazy_static::lazy_static! {
    static ref DOUBLE_BOND_PATTERNS: Vec<BondPattern> = vec![
        BondPattern::new(Element::C, Element::C, Some(BondOrder::Double)),
        BondPattern::new(Element::C, Element::O, Some(BondOrder::Double)),
        BondPattern::new(Element::C, Element::N, Some(BondOrder::Double)),
        BondPattern::new(Element::O, Element::O, Some(BondOrder::Double)),
        BondPattern::new(Element::O, Element::N, Some(BondOrder::Double)),
        BondPattern::new(Element::N, Element::N, Some(BondOrder::Double)),
    ];

    static ref TRIPLE_BOND_PATTERNS: Vec<BondPattern> = vec![
        BondPattern::new(Element::C, Element::C, Some(BondOrder::Triple)),
        BondPattern::new(Element::C, Element::N, Some(BondOrder::Triple)),
        BondPattern::new(Element::N, Element::N, Some(BondOrder::Triple)),
    ];

    static ref HETERO_BOND_PATTERNS: Vec<BondPattern> = vec![
        BondPattern::new(Element::C, Element::O, None),
        BondPattern::new(Element::C, Element::N, None),
        BondPattern::new(Element::N, Element::O, None),
    ];
}

fn any_match(mol: &Molecule, patterns: &[BondPattern]) -> bool {
    mol.bonds()
        .iter()
        .any(|bond| patterns.iter().any(|p| p.matches(bond, mol)))
}

pub fn is_aromatic(mol: &Molecule) -> bool {
    mol.atoms().iter().any(|atom| atom.aromatic)
}

pub fn has_double_bond(mol: &Molecule) -> bool {
    any_match(mol, &DOUBLE_BOND_PATTERNS)
}

pub fn has_triple_bond(mol: &Molecule) -> bool {
    any_match(mol, &TRIPLE_BOND_PATTERNS)
}

pub fn has_hetero_bond(mol: &Molecule) -> bool {
    any_match(mol, &HETERO_BOND_PATTERNS)
}

/// Any ring when `size` is None, otherwise a ring of exactly `size` atoms.
pub fn has_ring(mol: &Molecule, size: Option<usize>) -> bool {
    mol.has_ring(size)
}
