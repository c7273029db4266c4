//! Script composer: narration text from a game name and feature list.
//!
//! Generated scripts are assembled from an intro, one sentence per feature,
//! filler sentences, and a closing call to action. Fillers are added until the
//! target word band is reached. Every filler is at most 20 words, and the bands
//! are 20 words wide, so the minimum can always be met without passing the
//! maximum while fillers remain.

use shortsmith_common::error::ShortsError;
use shortsmith_project_model::layout::VideoMode;
use shortsmith_project_model::script::{Script, ScriptSource, WordBand};

const SHOWCASE_INTROS: &[&str] = &[
    "{game} pushes gaming boundaries in ways you have never experienced before.",
    "If you are looking for your next obsession, {game} deserves a spot on your list.",
    "Here is why everyone is suddenly talking about {game} right now.",
];

const SHOWCASE_FEATURES: &[&str] = &[
    "First up, {feature} changes how every single session plays out.",
    "On top of that, {feature} keeps things fresh hour after hour.",
    "Then there is {feature}, which the community cannot stop talking about.",
    "And {feature} adds a layer of depth most games never reach.",
];

const SHOWCASE_FILLERS: &[&str] = &[
    "With stunning visuals, innovative mechanics, and endless possibilities for adventure, this is a game that rewards creativity and skill.",
    "Whether you prefer solo challenges or multiplayer action, every session brings something new to discover.",
    "The world feels alive, packed with secrets that reward anyone willing to look a little closer.",
    "Every system connects to another, so small decisions snowball into moments you will remember for weeks.",
    "The developers clearly care, and it shows in every animation, sound effect, and tiny detail.",
    "It is easy to pick up, but mastering it will keep you busy for a very long time.",
    "Progression feels earned, and every upgrade opens up new ways to approach the same old problems.",
    "Runs never play out the same way twice, which keeps that one more try feeling alive.",
    "The soundtrack alone is worth the price of admission, and it fits every scene perfectly.",
    "Reviews keep climbing, and players keep finding new strategies long after the credits roll.",
    "Co-op sessions turn into chaotic stories you will be retelling to your friends for days.",
    "Even after dozens of hours, it still manages to surprise you with something you have not seen.",
];

const SHOWCASE_OUTRO: &str =
    "{game} is available now. What game should I cover next? Follow for daily gaming discoveries!";

const STRATEGY_INTROS: &[&str] = &[
    "Dive into the world of {game}, where strategic thinking meets empire building.",
    "Welcome to {game}, the ultimate test of strategic mastery.",
    "Experience the depth of {game}, where civilizations rise and fall based on your strategic vision.",
];

const STRATEGY_FEATURES: &[&str] = &[
    "You will love {feature}, which adds real weight to every turn.",
    "Veterans will appreciate {feature} and the new strategies it unlocks.",
    "There is also {feature}, which changes how empires grow.",
    "Finally, {feature} ties the whole experience together.",
];

const STRATEGY_FILLERS: &[&str] = &[
    "Plan your expansion, manage resources, and forge alliances in this epic 4X strategy experience.",
    "Every decision shapes your civilization's destiny.",
    "Will you conquer through military might or achieve victory through diplomacy and trade?",
    "Build cities, research technologies, and expand your borders in this turn-based strategy epic.",
    "Navigate complex diplomatic relationships while managing your economy and military.",
    "Your empire's future depends on every tactical choice you make.",
    "Explore vast worlds, develop advanced technologies, and lead your people to greatness.",
    "Balance warfare, diplomacy, and resource management across hundreds of turns.",
    "Rival empires adapt to your moves, so no two campaigns ever unfold the same way.",
    "The tech tree is massive, and every branch opens new paths to victory.",
    "Espionage, trade routes, and fragile treaties give the late game real tension.",
    "Custom maps and victory conditions let you shape every campaign around your own playstyle.",
    "One more turn quickly becomes three in the morning, and you will not regret a minute.",
    "Whether you prefer tall builds or wide conquest, the systems support your vision.",
    "Multiplayer matches turn alliances into betrayals and betrayals into legendary comebacks.",
    "Modding support keeps the community creating fresh scenarios, factions, and challenges every week.",
];

const STRATEGY_OUTRO: &str =
    "{game} is out now. Which strategy game should I cover next? Follow for more!";

/// A family of sentence templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateFamily {
    /// General game showcase.
    #[default]
    Showcase,
    /// 4X and grand strategy games.
    Strategy,
}

impl TemplateFamily {
    /// No-crop mode targets UI-dense strategy games.
    pub fn for_mode(mode: VideoMode) -> Self {
        match mode {
            VideoMode::NoCropBands => TemplateFamily::Strategy,
            VideoMode::Standard | VideoMode::BeautifulCaptions => TemplateFamily::Showcase,
        }
    }

    fn intros(self) -> &'static [&'static str] {
        match self {
            TemplateFamily::Showcase => SHOWCASE_INTROS,
            TemplateFamily::Strategy => STRATEGY_INTROS,
        }
    }

    fn features(self) -> &'static [&'static str] {
        match self {
            TemplateFamily::Showcase => SHOWCASE_FEATURES,
            TemplateFamily::Strategy => STRATEGY_FEATURES,
        }
    }

    fn fillers(self) -> &'static [&'static str] {
        match self {
            TemplateFamily::Showcase => SHOWCASE_FILLERS,
            TemplateFamily::Strategy => STRATEGY_FILLERS,
        }
    }

    fn outro(self) -> &'static str {
        match self {
            TemplateFamily::Showcase => SHOWCASE_OUTRO,
            TemplateFamily::Strategy => STRATEGY_OUTRO,
        }
    }
}

/// Composer settings.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    pub max_features: usize,
    pub words_per_minute: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_features: 4,
            words_per_minute: 180,
        }
    }
}

/// What to compose a script from.
#[derive(Debug, Clone)]
pub struct ScriptRequest<'a> {
    pub game_name: &'a str,
    pub features: &'a [String],
    /// Caller-supplied text, used verbatim when present.
    pub supplied: Option<&'a str>,
    pub family: TemplateFamily,
    pub band: WordBand,
}

/// A script plus the non-fatal length warning, if any.
#[derive(Debug)]
pub struct ComposedScript {
    pub script: Script,
    /// `ScriptTooShort` or `ScriptTooLong` for supplied text outside the band.
    pub warning: Option<ShortsError>,
}

/// Builds narration scripts. Pure: identical requests give identical scripts.
#[derive(Debug, Clone, Default)]
pub struct ScriptComposer {
    config: ComposerConfig,
}

impl ScriptComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn compose(&self, request: &ScriptRequest<'_>) -> ComposedScript {
        match request.supplied {
            Some(text) => self.use_supplied(text, request.band),
            None => ComposedScript {
                script: self.generate(request),
                warning: None,
            },
        }
    }

    fn use_supplied(&self, text: &str, band: WordBand) -> ComposedScript {
        let script = Script::new(
            text,
            band,
            ScriptSource::UserProvided,
            self.config.words_per_minute,
        );
        let words = script.word_count();
        let warning = if words < band.min {
            Some(ShortsError::ScriptTooShort {
                words,
                min: band.min,
            })
        } else if words > band.max {
            Some(ShortsError::ScriptTooLong {
                words,
                max: band.max,
            })
        } else {
            None
        };

        if let Some(warning) = &warning {
            tracing::warn!("{warning}; using supplied script as-is");
        }
        ComposedScript { script, warning }
    }

    fn generate(&self, request: &ScriptRequest<'_>) -> Script {
        let game = request.game_name.trim();
        let family = request.family;
        let band = request.band;
        let seed = fnv1a_64(game);

        let intro = pick(family.intros(), seed).replace("{game}", game);
        let outro = family.outro().replace("{game}", game);
        let mut total = word_count(&intro) + word_count(&outro);
        let mut body: Vec<String> = Vec::new();

        let feature_templates = family.features();
        for (i, feature) in request
            .features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .take(self.config.max_features)
            .enumerate()
        {
            let template = feature_templates[i % feature_templates.len()];
            let sentence = template.replace("{feature}", feature);
            let n = word_count(&sentence);
            if total + n <= band.max {
                body.push(sentence);
                total += n;
            } else {
                tracing::debug!(feature, "Feature sentence skipped, band would overflow");
            }
        }

        // Rotate the filler pool per game so different titles read differently.
        let fillers = family.fillers();
        let offset = (seed >> 8) as usize % fillers.len();
        for filler in fillers.iter().cycle().skip(offset).take(fillers.len()) {
            if total >= band.min {
                break;
            }
            let n = word_count(filler);
            if total + n <= band.max {
                body.push((*filler).to_string());
                total += n;
            }
        }

        let mut parts = Vec::with_capacity(body.len() + 2);
        parts.push(intro);
        parts.extend(body);
        parts.push(outro);
        let mut text = parts.join(" ");

        if word_count(&text) > band.max {
            text = truncate_words(&text, band.max);
        }

        let script = Script::new(
            &text,
            band,
            ScriptSource::Generated,
            self.config.words_per_minute,
        );
        tracing::info!(
            game,
            words = script.word_count(),
            min = band.min,
            max = band.max,
            "Generated script"
        );
        script
    }
}

/// Split a comma-separated feature list, dropping empty entries.
pub fn parse_features(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep at most `max` words, cutting back to the last sentence end if there
/// is one.
pub fn truncate_words(text: &str, max: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().take(max).collect();
    let sentence_end = words
        .iter()
        .rposition(|w| w.ends_with(['.', '!', '?']));
    match sentence_end {
        Some(end) => words[..=end].join(" "),
        None => words.join(" "),
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn pick(options: &'static [&'static str], seed: u64) -> &'static str {
    options[(seed % options.len() as u64) as usize]
}

/// Stable 64-bit FNV-1a hash.
fn fnv1a_64(input: &str) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(
        game: &'a str,
        features: &'a [String],
        family: TemplateFamily,
        band: WordBand,
    ) -> ScriptRequest<'a> {
        ScriptRequest {
            game_name: game,
            features,
            supplied: None,
            family,
            band,
        }
    }

    #[test]
    fn test_every_filler_fits_band_width() {
        for family in [TemplateFamily::Showcase, TemplateFamily::Strategy] {
            for filler in family.fillers() {
                assert!(word_count(filler) <= 20, "{filler}");
            }
        }
    }

    #[test]
    fn test_generated_scripts_land_in_band() {
        let composer = ScriptComposer::default();
        let features = parse_features("factory automation, co-op multiplayer, exploration");
        let none: Vec<String> = Vec::new();
        let games = [
            "Satisfactory",
            "Factorio",
            "Civilization VI",
            "Stellaris",
            "Dyson Sphere Program",
        ];

        for game in games {
            for family in [TemplateFamily::Showcase, TemplateFamily::Strategy] {
                for band in [WordBand::SHORT, WordBand::CONTEXT] {
                    for feats in [features.as_slice(), none.as_slice()] {
                        let composed = composer.compose(&request(game, feats, family, band));
                        let words = composed.script.word_count();
                        assert!(
                            band.contains(words),
                            "{game} {family:?} {band:?}: {words} words"
                        );
                        assert!(composed.warning.is_none());
                        assert_eq!(composed.script.source(), ScriptSource::Generated);
                        assert!(composed.script.text().contains(game));
                    }
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let composer = ScriptComposer::default();
        let features = parse_features("automation");
        let req = request("Satisfactory", &features, TemplateFamily::Showcase, WordBand::SHORT);
        assert_eq!(composer.compose(&req).script, composer.compose(&req).script);
    }

    #[test]
    fn test_features_are_mentioned_and_capped() {
        let composer = ScriptComposer::new(ComposerConfig {
            max_features: 2,
            words_per_minute: 180,
        });
        let features = parse_features("conveyor belts, power grids, alien fauna");
        let composed = composer.compose(&request(
            "Satisfactory",
            &features,
            TemplateFamily::Showcase,
            WordBand::CONTEXT,
        ));
        let text = composed.script.text();
        assert!(text.contains("conveyor belts"));
        assert!(text.contains("power grids"));
        assert!(!text.contains("alien fauna"));
    }

    #[test]
    fn test_outro_call_to_action_is_kept() {
        let composer = ScriptComposer::default();
        let composed = composer.compose(&request(
            "Stellaris",
            &[],
            TemplateFamily::Strategy,
            WordBand::SHORT,
        ));
        assert!(composed
            .script
            .text()
            .ends_with("Which strategy game should I cover next? Follow for more!"));
    }

    #[test]
    fn test_supplied_script_is_used_verbatim_with_warning() {
        let composer = ScriptComposer::default();
        let composed = composer.compose(&ScriptRequest {
            game_name: "Satisfactory",
            features: &[],
            supplied: Some("Satisfactory drops you on a massive alien world"),
            family: TemplateFamily::Showcase,
            band: WordBand::SHORT,
        });
        assert_eq!(
            composed.script.text(),
            "Satisfactory drops you on a massive alien world"
        );
        assert_eq!(composed.script.source(), ScriptSource::UserProvided);
        assert!(matches!(
            composed.warning,
            Some(ShortsError::ScriptTooShort { words: 8, min: 80 })
        ));
        assert!(composed.warning.as_ref().is_some_and(ShortsError::is_warning));
    }

    #[test]
    fn test_supplied_script_too_long_warns() {
        let composer = ScriptComposer::default();
        let long = vec!["word"; 120].join(" ");
        let composed = composer.compose(&ScriptRequest {
            game_name: "Factorio",
            features: &[],
            supplied: Some(&long),
            family: TemplateFamily::Showcase,
            band: WordBand::SHORT,
        });
        assert_eq!(composed.script.word_count(), 120);
        assert!(matches!(
            composed.warning,
            Some(ShortsError::ScriptTooLong { words: 120, max: 100 })
        ));
    }

    #[test]
    fn test_truncate_prefers_sentence_boundary() {
        let text = "One two three. Four five six seven.";
        assert_eq!(truncate_words(text, 5), "One two three.");
        assert_eq!(truncate_words("no stops here at all", 3), "no stops here");
    }

    #[test]
    fn test_template_family_for_mode() {
        assert_eq!(TemplateFamily::for_mode(VideoMode::NoCropBands), TemplateFamily::Strategy);
        assert_eq!(TemplateFamily::for_mode(VideoMode::Standard), TemplateFamily::Showcase);
        assert_eq!(
            TemplateFamily::for_mode(VideoMode::BeautifulCaptions),
            TemplateFamily::Showcase
        );
    }

    #[test]
    fn test_parse_features_drops_blanks() {
        assert_eq!(
            parse_features(" automation , ,co-op,"),
            vec!["automation".to_string(), "co-op".to_string()]
        );
    }
}
