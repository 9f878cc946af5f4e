use crate::parameters::Role;

use std::collections::HashSet;

/// Number of polynomial degree columns, `c0` to `c9`
pub const POLY_DEGREES: usize = 10;

/// Number of ramp terms, `r0` to `r5`
pub const RAMP_TERMS: usize = 6;

/// Family of a systematics coefficient
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoefficientKind {
    /// Polynomial in time, the term is the degree
    Polynomial,
    /// Double-exponential ramp, terms are `amplitude1, decay1, offset1, amplitude2, decay2,
    /// offset2`
    Ramp,
}

impl CoefficientKind {
    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'c' => Some(Self::Polynomial),
            'r' => Some(Self::Ramp),
            _ => None,
        }
    }

    pub fn n_terms(self) -> usize {
        match self {
            Self::Polynomial => POLY_DEGREES,
            Self::Ramp => RAMP_TERMS,
        }
    }
}

/// Per-channel polynomial and ramp coefficient cells
///
/// A cell is either empty or holds a `T`, which is the source parameter name right after
/// decoding and a resolved model input later.
#[derive(Clone, Debug, PartialEq)]
pub struct CoefficientTable<T> {
    poly: Vec<[Option<T>; POLY_DEGREES]>,
    ramp: Vec<[Option<T>; RAMP_TERMS]>,
}

impl<T> CoefficientTable<T> {
    pub fn empty(nchan: usize) -> Self {
        Self {
            poly: (0..nchan).map(|_| std::array::from_fn(|_| None)).collect(),
            ramp: (0..nchan).map(|_| std::array::from_fn(|_| None)).collect(),
        }
    }

    #[inline]
    pub fn nchan(&self) -> usize {
        self.poly.len()
    }

    pub fn poly(&self, channel: usize) -> &[Option<T>; POLY_DEGREES] {
        &self.poly[channel]
    }

    pub fn ramp(&self, channel: usize) -> &[Option<T>; RAMP_TERMS] {
        &self.ramp[channel]
    }

    pub fn get(&self, kind: CoefficientKind, term: usize, channel: usize) -> Option<&T> {
        match kind {
            CoefficientKind::Polynomial => self.poly[channel][term].as_ref(),
            CoefficientKind::Ramp => self.ramp[channel][term].as_ref(),
        }
    }

    fn cell_mut(&mut self, kind: CoefficientKind, term: usize, channel: usize) -> &mut Option<T> {
        match kind {
            CoefficientKind::Polynomial => &mut self.poly[channel][term],
            CoefficientKind::Ramp => &mut self.ramp[channel][term],
        }
    }

    pub fn has_ramp(&self) -> bool {
        self.ramp.iter().flatten().any(Option::is_some)
    }

    /// Transform every populated cell, cells mapped to `None` become empty
    pub fn filter_map<V>(&self, f: impl Fn(&T) -> Option<V>) -> CoefficientTable<V> {
        CoefficientTable {
            poly: self
                .poly
                .iter()
                .map(|row| std::array::from_fn(|i| row[i].as_ref().and_then(&f)))
                .collect(),
            ramp: self
                .ramp
                .iter()
                .map(|row| std::array::from_fn(|i| row[i].as_ref().and_then(&f)))
                .collect(),
        }
    }

    /// Number of polynomial columns up to the highest one where `populated` holds for any
    /// channel, interior columns are never dropped
    pub fn poly_len(&self, populated: impl Fn(&T) -> bool) -> usize {
        (0..POLY_DEGREES)
            .rev()
            .find(|&degree| {
                self.poly
                    .iter()
                    .any(|row| row[degree].as_ref().is_some_and(&populated))
            })
            .map_or(0, |degree| degree + 1)
    }
}

impl CoefficientTable<String> {
    /// Distinct source names in the canonical order: polynomial before ramp, ascending term,
    /// ascending channel
    ///
    /// Decoding these names with the same roles gives back the same table.
    pub fn names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let poly = (0..POLY_DEGREES)
            .flat_map(|degree| self.poly.iter().filter_map(move |row| row[degree].as_ref()));
        let ramp = (0..RAMP_TERMS)
            .flat_map(|term| self.ramp.iter().filter_map(move |row| row[term].as_ref()));
        poly.chain(ramp)
            .filter(|&name| seen.insert(name))
            .cloned()
            .collect()
    }
}

/// Coefficient-like names the decoder didn't place into the table
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeReport {
    ignored: Vec<String>,
}

impl DecodeReport {
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub fn n_ignored(&self) -> usize {
        self.ignored.len()
    }
}

/// Position of a coefficient in the table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoefficientTarget {
    pub kind: CoefficientKind,
    pub term: usize,
    pub channel: Option<usize>,
}

/// Whether a name looks like a coefficient: family letter followed by a digit
///
/// Other names, like `rp` or `Rs`, are regular parameters and aren't decoded at all.
pub fn is_coefficient_like(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().and_then(CoefficientKind::from_letter).is_some()
        && chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// Parse `<letter><term>` or `<letter><term>_<channel>`
///
/// Bounds are checked against the family size and `nchan`. Channel suffix is accepted for
/// multi-channel tables only.
pub fn parse_coefficient_name(name: &str, nchan: usize) -> Option<CoefficientTarget> {
    let mut chars = name.chars();
    let kind = chars.next().and_then(CoefficientKind::from_letter)?;
    let rest = chars.as_str();
    let (term, channel) = match rest.split_once('_') {
        Some((term, channel)) => {
            if nchan <= 1 {
                return None;
            }
            (term, Some(parse_index(channel)?))
        }
        None => (rest, None),
    };
    let term = parse_index(term)?;
    if term >= kind.n_terms() || channel.is_some_and(|channel| channel >= nchan) {
        return None;
    }
    Some(CoefficientTarget {
        kind,
        term,
        channel,
    })
}

fn parse_index(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Decode coefficient names into a per-channel table
///
/// A name without a channel suffix goes to every channel when it is shared or the table has
/// a single channel, and to channel zero otherwise. Coefficient-like names which don't fit
/// the grammar or the table bounds are skipped and listed in the report.
pub fn decode<'a>(
    parameters: impl IntoIterator<Item = (&'a str, Role)>,
    nchan: usize,
) -> (CoefficientTable<String>, DecodeReport) {
    let mut table = CoefficientTable::empty(nchan);
    let mut report = DecodeReport::default();
    for (name, role) in parameters {
        if !is_coefficient_like(name) {
            continue;
        }
        let Some(target) = parse_coefficient_name(name, nchan) else {
            log::debug!("ignoring parameter {name}, it is not a valid coefficient name");
            report.ignored.push(name.to_owned());
            continue;
        };
        let channels = match target.channel {
            Some(channel) => channel..channel + 1,
            None if role == Role::Shared || nchan == 1 => 0..nchan,
            None => 0..1,
        };
        for channel in channels {
            *table.cell_mut(target.kind, target.term, channel) = Some(name.to_owned());
        }
    }
    (table, report)
}
