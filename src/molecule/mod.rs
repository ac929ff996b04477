//! Minimal molecular-graph capability for the QM9 element set (H, C, N, O,
//! F). Covers what the structural classifier and graph featurizer need:
//! atoms with aromaticity/charge flags, typed bonds, ring perception and a
//! bonding-derived hybridization assignment.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub mod smiles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    H,
    C,
    N,
    O,
    F,
}

impl Element {
    pub const COUNT: usize = 5;

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "H" => Some(Element::H),
            "C" => Some(Element::C),
            "N" => Some(Element::N),
            "O" => Some(Element::O),
            "F" => Some(Element::F),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
        }
    }

    /// Discrete class index for categorical featurization.
    pub fn class_index(&self) -> u32 {
        match self {
            Element::H => 0,
            Element::C => 1,
            Element::N => 2,
            Element::O => 3,
            Element::F => 4,
        }
    }

    pub fn is_heavy(&self) -> bool {
        !matches!(self, Element::H)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    pub const COUNT: usize = 4;

    pub fn class_index(&self) -> u32 {
        match self {
            BondOrder::Single => 0,
            BondOrder::Double => 1,
            BondOrder::Triple => 2,
            BondOrder::Aromatic => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hybridization {
    SP,
    SP2,
    SP3,
}

impl Hybridization {
    pub const COUNT: usize = 3;

    pub fn class_index(&self) -> u32 {
        match self {
            Hybridization::SP => 0,
            Hybridization::SP2 => 1,
            Hybridization::SP3 => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub element: Element,
    pub aromatic: bool,
    pub formal_charge: i8,
    pub explicit_hs: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl Molecule {
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        Molecule { atoms, bonds }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn neighbors(&self, idx: usize) -> Vec<usize> {
        self.bonds
            .iter()
            .filter_map(|bond| {
                if bond.a == idx {
                    Some(bond.b)
                } else if bond.b == idx {
                    Some(bond.a)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Hybridization assigned from the bonding pattern: aromatic atoms are
    /// sp2; a triple bond or cumulated double bonds make an atom sp; a
    /// single double bond makes it sp2; anything else is sp3.
    pub fn hybridization(&self, idx: usize) -> Hybridization {
        if self.atoms[idx].aromatic {
            return Hybridization::SP2;
        }

        let mut doubles = 0;
        let mut triples = 0;
        for bond in self.bonds.iter().filter(|b| b.a == idx || b.b == idx) {
            match bond.order {
                BondOrder::Double => doubles += 1,
                BondOrder::Triple => triples += 1,
                _ => {}
            }
        }

        if triples > 0 || doubles >= 2 {
            Hybridization::SP
        } else if doubles == 1 {
            Hybridization::SP2
        } else {
            Hybridization::SP3
        }
    }

    /// Size of the smallest ring each in-ring bond participates in,
    /// deduplicated and sorted. Found by removing one bond at a time and
    /// searching for the shortest remaining path between its endpoints.
    pub fn ring_sizes(&self) -> Vec<usize> {
        let mut sizes = std::collections::BTreeSet::new();
        for (skip, bond) in self.bonds.iter().enumerate() {
            if let Some(dist) = self.shortest_path_without(bond.a, bond.b, skip) {
                sizes.insert(dist + 1);
            }
        }
        sizes.into_iter().collect()
    }

    /// Any ring when `size` is None, otherwise a ring of exactly that size.
    pub fn has_ring(&self, size: Option<usize>) -> bool {
        let sizes = self.ring_sizes();
        match size {
            None => !sizes.is_empty(),
            Some(n) => sizes.contains(&n),
        }
    }

    fn shortest_path_without(&self, from: usize, to: usize, skip: usize) -> Option<usize> {
        let mut dist = vec![usize::MAX; self.atoms.len()];
        let mut queue = VecDeque::new();
        dist[from] = 0;
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            if current == to {
                return Some(dist[current]);
            }
            for (ii, bond) in self.bonds.iter().enumerate() {
                if ii == skip {
                    continue;
                }
                let next = if bond.a == current {
                    bond.b
                } else if bond.b == current {
                    bond.a
                } else {
                    continue;
                };
                if dist[next] == usize::MAX {
                    dist[next] = dist[current] + 1;
                    queue.push_back(next);
                }
            }
        }

        None
    }
}
