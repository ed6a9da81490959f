/// Which era a map is currently shown in.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum Tense {
    #[default]
    Present,
    Past,
}

impl Tense {
    pub fn toggled(self) -> Self {
        match self {
            Tense::Present => Tense::Past,
            Tense::Past => Tense::Present,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tense::Present => "Present",
            Tense::Past => "Past",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_flips_between_eras() {
        assert_eq!(Tense::default(), Tense::Present);
        assert_eq!(Tense::Present.toggled(), Tense::Past);
        assert_eq!(Tense::Past.toggled(), Tense::Present);
    }
}
