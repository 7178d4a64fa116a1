use anyhow::{Result, anyhow};
use std::{
    collections::BTreeSet,
    fmt::{Debug, Display, Formatter},
};

/// A bag of tokens: for each place, the number of tokens it holds.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Marking {
    pub(crate) place2token: Vec<u64>, //for each place: number of tokens in that place
}

impl Marking {
    pub fn new(size: usize) -> Self {
        Marking {
            place2token: vec![0; size],
        }
    }

    pub fn get_place2token(&self) -> &Vec<u64> {
        &self.place2token
    }

    pub fn from_vec(place2token: Vec<u64>) -> Self {
        Marking {
            place2token: place2token,
        }
    }

    pub fn increase(&mut self, place: usize, amount: u64) -> Result<()> {
        let tokens = self
            .place2token
            .get_mut(place)
            .ok_or_else(|| anyhow!("non-existing place {} referenced in a marking", place))?;
        *tokens = tokens.checked_add(amount).ok_or_else(|| {
            anyhow!(
                "tried to put too many tokens in a marking for place {}",
                place
            )
        })?;
        Ok(())
    }

    pub fn decrease(&mut self, place: usize, amount: u64) -> Result<()> {
        let tokens = self
            .place2token
            .get_mut(place)
            .ok_or_else(|| anyhow!("non-existing place {} referenced in a marking", place))?;
        if *tokens < amount {
            return Err(anyhow!(
                "tried to obtain a negative number of tokens in a marking for place {}",
                place
            ));
        }
        *tokens -= amount;
        Ok(())
    }

    pub fn add_place(&mut self) {
        self.place2token.push(0);
    }

    pub fn get_number_of_places(&self) -> usize {
        self.place2token.len()
    }

    pub fn has_token(&self, place: usize) -> bool {
        self.place2token.get(place).is_some_and(|tokens| *tokens > 0)
    }

    /**
     * Returns the size of the bag.
     */
    pub fn number_of_tokens(&self) -> u64 {
        self.place2token.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.place2token.iter().all(|tokens| *tokens == 0)
    }

    /**
     * Returns the places that hold at least one token, in place order.
     */
    pub fn marked_places(&self) -> BTreeSet<usize> {
        self.place2token
            .iter()
            .enumerate()
            .filter_map(|(place, tokens)| if *tokens > 0 { Some(place) } else { None })
            .collect()
    }

    /**
     * Returns whether both markings mark the same places, regardless of how many tokens each place holds.
     * On unsafe nets, this may hold while surplus tokens are still in flight.
     */
    pub fn has_same_places(&self, other: &Self) -> bool {
        let len = self.place2token.len().max(other.place2token.len());
        (0..len).all(|place| self.has_token(place) == other.has_token(place))
    }
}

impl From<Vec<u64>> for Marking {
    fn from(value: Vec<u64>) -> Self {
        Self { place2token: value }
    }
}

impl Display for Marking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (place, multiplicity) in self.place2token.iter().enumerate() {
            if *multiplicity > 0 {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{}:{}", place, multiplicity)?;
            }
        }
        write!(f, "}}")
    }
}

impl Debug for Marking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
