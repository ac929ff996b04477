//! SMILES reader scoped to the QM9 corpus: organic-subset and bracket atoms
//! over H/C/N/O/F, aromatic lowercase forms, branches, ring closures
//! (including `%nn` two-digit labels) and explicit bond symbols. Chirality
//! and isotope markers are accepted and ignored; they carry no weight in
//! the downstream featurization.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::molecule::{Atom, Bond, BondOrder, Element, Molecule};

lazy_static::lazy_static! {
    static ref TOKEN_RE: regex::Regex = regex::Regex::new(
        r"\[[^\]]+\]|Br?|Cl?|N|O|S|P|F|I|b|c|n|o|s|p|\(|\)|\.|=|#|-|\+|\\|/|:|%[0-9]{2}|[0-9]"
    )
    .unwrap();
}

/// Parses a SMILES string into a [`Molecule`].
pub fn parse(smi: &str) -> Result<Molecule> {
    let tokens: Vec<&str> = TOKEN_RE.find_iter(smi).map(|m| m.as_str()).collect();
    let consumed: usize = tokens.iter().map(|t| t.len()).sum();
    if consumed != smi.len() {
        return Err(Error::malformed(
            format!("smiles {:?}", smi),
            "unrecognized characters in SMILES string",
        ));
    }

    let mut builder = Builder::new(smi);
    for token in tokens {
        builder.consume(token)?;
    }
    builder.finish()
}

struct Builder<'a> {
    smi: &'a str,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    prev: Option<usize>,
    pending_bond: Option<BondOrder>,
    branch_stack: Vec<Option<usize>>,
    // Open ring-closure labels: label -> (atom, bond order at the opening).
    ring_closures: HashMap<u8, (usize, Option<BondOrder>)>,
}

impl<'a> Builder<'a> {
    fn new(smi: &'a str) -> Self {
        Builder {
            smi,
            atoms: Vec::new(),
            bonds: Vec::new(),
            prev: None,
            pending_bond: None,
            branch_stack: Vec::new(),
            ring_closures: HashMap::new(),
        }
    }

    fn malformed(&self, reason: impl std::fmt::Display) -> Error {
        Error::malformed(format!("smiles {:?}", self.smi), reason)
    }

    fn consume(&mut self, token: &str) -> Result<()> {
        match token {
            "(" => {
                self.branch_stack.push(self.prev);
            }
            ")" => {
                self.prev = self
                    .branch_stack
                    .pop()
                    .ok_or_else(|| self.malformed("unbalanced branch parentheses"))?;
            }
            "." => {
                if self.pending_bond.is_some() {
                    return Err(self.malformed("bond symbol before component separator"));
                }
                self.prev = None;
            }
            "-" | "/" | "\\" => self.pending_bond = Some(BondOrder::Single),
            "=" => self.pending_bond = Some(BondOrder::Double),
            "#" => self.pending_bond = Some(BondOrder::Triple),
            ":" => self.pending_bond = Some(BondOrder::Aromatic),
            "+" => return Err(self.malformed("charge symbol outside brackets")),
            _ if token.starts_with('%') || token.chars().all(|c| c.is_ascii_digit()) => {
                let label: u8 = token
                    .trim_start_matches('%')
                    .parse()
                    .map_err(|_| self.malformed("bad ring-closure label"))?;
                self.close_or_open_ring(label)?;
            }
            _ if token.starts_with('[') => {
                let atom = self.parse_bracket_atom(token)?;
                self.add_atom(atom)?;
            }
            _ => {
                let atom = self.parse_organic_atom(token)?;
                self.add_atom(atom)?;
            }
        }
        Ok(())
    }

    fn parse_organic_atom(&self, token: &str) -> Result<Atom> {
        let (element, aromatic) = match token {
            "C" => (Element::C, false),
            "N" => (Element::N, false),
            "O" => (Element::O, false),
            "F" => (Element::F, false),
            "c" => (Element::C, true),
            "n" => (Element::N, true),
            "o" => (Element::O, true),
            _ => {
                return Err(self.malformed(format!(
                    "element {:?} is outside the supported set (H, C, N, O, F)",
                    token
                )))
            }
        };
        Ok(Atom {
            element,
            aromatic,
            formal_charge: 0,
            explicit_hs: 0,
        })
    }

    fn parse_bracket_atom(&self, token: &str) -> Result<Atom> {
        let inner = &token[1..token.len() - 1];
        let mut chars = inner.chars().peekable();

        // Optional isotope prefix, ignored.
        while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            chars.next();
        }

        let symbol = chars
            .next()
            .ok_or_else(|| self.malformed("empty bracket atom"))?;
        let (element, aromatic) = match symbol {
            'H' => (Element::H, false),
            'C' => (Element::C, false),
            'N' => (Element::N, false),
            'O' => (Element::O, false),
            'F' => (Element::F, false),
            'c' => (Element::C, true),
            'n' => (Element::N, true),
            'o' => (Element::O, true),
            other => {
                return Err(self.malformed(format!(
                    "element {:?} is outside the supported set (H, C, N, O, F)",
                    other
                )))
            }
        };

        let mut explicit_hs: u8 = 0;
        let mut formal_charge: i8 = 0;
        while let Some(c) = chars.next() {
            match c {
                '@' => {} // chirality marker, ignored
                'H' => {
                    explicit_hs = 1;
                    let mut digits = String::new();
                    while chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                        digits.push(chars.next().unwrap());
                    }
                    if !digits.is_empty() {
                        explicit_hs = digits
                            .parse()
                            .map_err(|_| self.malformed("bad hydrogen count"))?;
                    }
                }
                '+' | '-' => {
                    let sign: i8 = if c == '+' { 1 } else { -1 };
                    let mut magnitude: i8 = 1;
                    let mut digits = String::new();
                    while chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                        digits.push(chars.next().unwrap());
                    }
                    if !digits.is_empty() {
                        magnitude = digits
                            .parse()
                            .map_err(|_| self.malformed("bad charge magnitude"))?;
                    } else {
                        while chars.peek() == Some(&c) {
                            chars.next();
                            magnitude += 1;
                        }
                    }
                    formal_charge = sign * magnitude;
                }
                other => {
                    return Err(
                        self.malformed(format!("unsupported bracket-atom marker {:?}", other))
                    )
                }
            }
        }

        Ok(Atom {
            element,
            aromatic,
            formal_charge,
            explicit_hs,
        })
    }

    fn add_atom(&mut self, atom: Atom) -> Result<()> {
        let idx = self.atoms.len();
        self.atoms.push(atom);

        if let Some(prev) = self.prev {
            let order = self.resolve_bond_order(prev, idx);
            self.bonds.push(Bond {
                a: prev,
                b: idx,
                order,
            });
        }

        self.prev = Some(idx);
        self.pending_bond = None;
        Ok(())
    }

    fn close_or_open_ring(&mut self, label: u8) -> Result<()> {
        let current = self
            .prev
            .ok_or_else(|| self.malformed("ring-closure label before any atom"))?;

        match self.ring_closures.remove(&label) {
            Some((open_atom, open_order)) => {
                if open_atom == current {
                    return Err(self.malformed("ring closure back to the same atom"));
                }
                let order = self
                    .pending_bond
                    .or(open_order)
                    .unwrap_or_else(|| self.default_bond_order(open_atom, current));
                self.bonds.push(Bond {
                    a: open_atom,
                    b: current,
                    order,
                });
            }
            None => {
                self.ring_closures
                    .insert(label, (current, self.pending_bond));
            }
        }

        self.pending_bond = None;
        Ok(())
    }

    fn resolve_bond_order(&self, a: usize, b: usize) -> BondOrder {
        self.pending_bond
            .unwrap_or_else(|| self.default_bond_order(a, b))
    }

    fn default_bond_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn finish(self) -> Result<Molecule> {
        if !self.branch_stack.is_empty() {
            return Err(self.malformed("unclosed branch parenthesis"));
        }
        if !self.ring_closures.is_empty() {
            let labels: Vec<u8> = self.ring_closures.keys().copied().collect();
            return Err(self.malformed(format!("unclosed ring labels {:?}", labels)));
        }
        if self.atoms.is_empty() {
            return Err(self.malformed("no atoms"));
        }
        Ok(Molecule::new(self.atoms, self.bonds))
    }
}
