use super::models::Strategy;

/// Per-strategy result counts for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyQuotas {
    pub artist_based: usize,
    pub genre_based: usize,
    pub collaborative: usize,
    pub exploratory: usize,
}

impl StrategyQuotas {
    /// 40/30/20 by floor division; exploratory takes whatever is left.
    pub fn for_limit(limit: usize) -> Self {
        let artist_based = limit * 4 / 10;
        let genre_based = limit * 3 / 10;
        let collaborative = limit * 2 / 10;
        Self {
            artist_based,
            genre_based,
            collaborative,
            exploratory: limit - artist_based - genre_based - collaborative,
        }
    }

    pub fn get(&self, strategy: Strategy) -> usize {
        match strategy {
            Strategy::ArtistBased => self.artist_based,
            Strategy::GenreBased => self.genre_based,
            Strategy::Collaborative => self.collaborative,
            Strategy::Exploratory => self.exploratory,
        }
    }

    pub fn total(&self) -> usize {
        self.artist_based + self.genre_based + self.collaborative + self.exploratory
    }
}
