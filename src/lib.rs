pub mod config;
pub mod driver;
pub mod filter;
pub mod generators;
pub mod items;
pub mod lanes;
pub mod pseudohash;
pub mod rng;
pub mod seed;
pub mod state;
pub mod streams;
pub mod tables;

/// SIMD lane width used throughout the batch driver and vector prefilter.
pub const LANES: usize = 8;

/// decks and stakes, mirroring the reference game's run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deck {
    Red,
    Blue,
    Yellow,
    Green,
    Black,
    Magic,
    Nebula,
    Ghost,
    Abandoned,
    Checkered,
    Zodiac,
    Painted,
    Anaglyph,
    Plasma,
    Erratic,
}

impl Default for Deck {
    fn default() -> Self {
        Deck::Red
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stake {
    White,
    Red,
    Green,
    Black,
    Blue,
    Purple,
    Orange,
    Gold,
}

impl Default for Stake {
    fn default() -> Self {
        Stake::White
    }
}

impl Stake {
    /// eternal/perishable stickers require at least Black stake.
    pub fn allows_eternal_perishable(self) -> bool {
        self >= Stake::Black
    }
    /// rental stickers require Gold stake.
    pub fn allows_rental(self) -> bool {
        self >= Stake::Gold
    }
}

/// sets up combined file + terminal logging under `logs/<unix-timestamp>.log`
/// before a search run starts.
pub fn init() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{time}.log"))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).ok();
    Ok(())
}
