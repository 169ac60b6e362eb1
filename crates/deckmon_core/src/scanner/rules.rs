//! Per-process classification rules.
//!
//! Each rule looks at one [`ProcessSample`] and either emits a [`Candidate`],
//! drops the process, or passes it on. [`RULES`] fixes the evaluation order;
//! the first rule that does not pass wins.

use super::process::fold_game_id;
use crate::appid;
use crate::config::ScannerRules;
use crate::error::{Error, Result};
use crate::manifest::ManifestIndex;
use crate::model::{Candidate, GameType, ProcessSample};
use crate::shortcuts::ShortcutIndex;
use regex::Regex;
use std::collections::HashSet;

/// What a single rule decided about a process.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The process is a game candidate.
    Emit(Candidate),
    /// The process is definitely not a game; stop evaluating rules.
    Drop,
    /// Not this rule's business.
    Pass,
}

/// Everything a rule may consult.
pub struct RuleContext<'a> {
    pub rules: &'a RuleSet,
    pub manifests: &'a ManifestIndex,
    pub shortcuts: &'a ShortcutIndex,
}

pub type Rule = fn(&RuleContext<'_>, &ProcessSample) -> RuleOutcome;

/// The classification chain in priority order.
///
/// The launch wrapper and DOS rules run before the ignore filter because
/// their command lines contain ignored markers themselves.
pub const RULES: &[(&str, Rule)] = &[
    ("launch-wrapper", launch_wrapper_rule),
    ("dos-library", dos_rule),
    ("ignore-list", ignore_rule),
    ("steam-native", steam_native_rule),
    ("shortcut", shortcut_rule),
    ("rom", rom_rule),
    ("path-fallback", path_fallback_rule),
];

/// [`ScannerRules`] compiled into lookup sets and regexes.
#[derive(Debug, Clone)]
pub struct RuleSet {
    ignore_markers: Vec<String>,
    technical_folders: HashSet<String>,
    skip_folders: HashSet<String>,
    game_path_markers: Vec<String>,
    dos_frontend_names: HashSet<String>,
    launch_wrappers: HashSet<String>,
    min_folder_len: usize,
    rom_path: Regex,
    dos_path: Regex,
}

fn lowered(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn alternation(list: &[String]) -> String {
    let mut items = lowered(list);
    // Longest first so `gba` is tried before `gb`.
    items.sort_by_key(|s| std::cmp::Reverse(s.len()));
    items
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidConfig(format!("{}: {}", pattern, e)))
}

impl RuleSet {
    pub fn compile(rules: &ScannerRules) -> Result<Self> {
        if rules.rom_extensions.is_empty() || rules.dos_script_extensions.is_empty() {
            return Err(Error::InvalidConfig(
                "rom_extensions and dos_script_extensions must not be empty".to_string(),
            ));
        }

        let rom_path = compile(&format!(
            r"(?i)/{}/[^/]+/([^/]+?)\.(?:{})\b",
            regex::escape(rules.rom_folder.trim()),
            alternation(&rules.rom_extensions)
        ))?;
        let dos_path = compile(&format!(
            r"(?i)/{}/.*/([^/]+?)\.(?:{})\b",
            regex::escape(rules.dos_library_folder.trim()),
            alternation(&rules.dos_script_extensions)
        ))?;

        Ok(Self {
            ignore_markers: lowered(&rules.ignore_markers),
            technical_folders: lowered(&rules.technical_folders).into_iter().collect(),
            skip_folders: lowered(&rules.skip_folders).into_iter().collect(),
            game_path_markers: lowered(&rules.game_path_markers),
            dos_frontend_names: lowered(&rules.dos_frontend_names).into_iter().collect(),
            launch_wrappers: lowered(&rules.launch_wrappers).into_iter().collect(),
            min_folder_len: rules.min_folder_len,
            rom_path,
            dos_path,
        })
    }

    fn is_ignored(&self, command_line: &str) -> bool {
        let lower = command_line.to_lowercase();
        self.ignore_markers.iter().any(|m| lower.contains(m.as_str()))
    }

    fn looks_like_game(&self, command_line: &str) -> bool {
        let lower = command_line.to_lowercase();
        self.game_path_markers.iter().any(|m| lower.contains(m.as_str()))
    }

    fn is_launch_wrapper(&self, command_line: &str) -> bool {
        command_line.split_whitespace().any(|token| {
            let name = token.rsplit(['/', '\\']).next().unwrap_or(token);
            self.launch_wrappers.contains(&name.to_lowercase())
        })
    }

    fn is_dos_frontend(&self, name: &str) -> bool {
        self.dos_frontend_names.contains(&name.trim().to_lowercase())
    }

    /// Whether a path segment may be taken as a game folder name.
    fn is_folder_candidate(&self, segment: &str) -> bool {
        let lower = segment.to_lowercase();
        !(segment.starts_with('.')
            || segment.chars().count() < self.min_folder_len
            || self.technical_folders.contains(&lower)
            || self.skip_folders.contains(&lower)
            || version_regex().is_match(&lower))
    }
}

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).unwrap())
        }
    };
}

static_regex!(wrapper_app_id_regex, r"(?i)\bAppId=(\d+)");
static_regex!(rungameid_regex, r"(?i)steam://rungameid/(\d+)");
static_regex!(game_id_arg_regex, r"(?i)\bSteamGameId=(\d+)");
static_regex!(year_tag_regex, r"\s*\(\d{4}\)");
static_regex!(bracket_tag_regex, r"[\(\[][^\]\)]*[\]\)]");
static_regex!(common_folder_regex, r"(?i)steamapps[/\\]common[/\\]([^/\\]+)");
static_regex!(windows_exe_regex, r#"(?i)[a-z]:\\(?:[^\\"\n]+\\)+[^\\"\n]*?\.exe"#);
static_regex!(unix_path_regex, r#"/(?:[^/\s"']+(?: [^/\s"'-][^/\s"']*)*/)+[^/\s"']+"#);
static_regex!(version_regex, r"^v?\d+(?:[._-]\d+)*[a-z]?$");

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// App id hint carried by the process: environment first, then command line.
///
/// Command line ids are folded like the environment ones, so a shortcut's
/// 64-bit game id comes back as its runtime id.
pub fn extract_app_id(sample: &ProcessSample) -> Option<String> {
    if let Some(id) = &sample.env_app_id {
        return Some(id.clone());
    }
    [wrapper_app_id_regex(), rungameid_regex(), game_id_arg_regex()]
        .iter()
        .filter_map(|re| re.captures(&sample.command_line))
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .find(|&id| id != 0)
        .map(|id| fold_game_id(id).to_string())
}

/// The longest filesystem path mentioned in a command line, with `/`
/// separators.
pub fn longest_path(command_line: &str) -> Option<String> {
    windows_exe_regex()
        .find_iter(command_line)
        .chain(unix_path_regex().find_iter(command_line))
        .map(|m| m.as_str())
        .max_by_key(|p| p.len())
        .map(|p| p.replace('\\', "/"))
}

/// Walks a path's directories from the innermost outward and returns the
/// first one that reads like a game folder.
pub fn folder_from_path(rules: &RuleSet, path: &str) -> Option<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let (_, dirs) = segments.split_last()?;
    dirs.iter()
        .rev()
        .find(|s| rules.is_folder_candidate(s))
        .map(|s| s.trim().to_string())
}

fn launch_wrapper_rule(ctx: &RuleContext<'_>, sample: &ProcessSample) -> RuleOutcome {
    if !ctx.rules.is_launch_wrapper(&sample.command_line) {
        return RuleOutcome::Pass;
    }
    let Some(caps) = wrapper_app_id_regex().captures(&sample.command_line) else {
        return RuleOutcome::Pass;
    };
    let app_id = &caps[1];
    match ctx.shortcuts.title_for_id(app_id) {
        Some(title) if !ctx.rules.is_dos_frontend(title) => RuleOutcome::Emit(
            Candidate::resolved(title, Some(app_id.to_string()), GameType::NonSteam, sample)
                .saturated(),
        ),
        _ => RuleOutcome::Pass,
    }
}

fn dos_rule(ctx: &RuleContext<'_>, sample: &ProcessSample) -> RuleOutcome {
    let Some(caps) = ctx.rules.dos_path.captures(&sample.command_line) else {
        return RuleOutcome::Pass;
    };
    let name = year_tag_regex().replace_all(&caps[1], "");
    let name = collapse_whitespace(&name);
    if name.is_empty() || ctx.rules.is_dos_frontend(&name) {
        return RuleOutcome::Pass;
    }
    RuleOutcome::Emit(Candidate::unresolved(name, None, GameType::ExoDos, sample).saturated())
}

fn ignore_rule(ctx: &RuleContext<'_>, sample: &ProcessSample) -> RuleOutcome {
    if ctx.rules.is_ignored(&sample.command_line) {
        RuleOutcome::Drop
    } else {
        RuleOutcome::Pass
    }
}

fn steam_native_rule(ctx: &RuleContext<'_>, sample: &ProcessSample) -> RuleOutcome {
    let Some(app_id) = extract_app_id(sample) else {
        return RuleOutcome::Pass;
    };
    if !appid::is_genuine_str(&app_id) {
        return RuleOutcome::Pass;
    }
    match ctx.manifests.title_for_app_id(&app_id) {
        Some(title) => RuleOutcome::Emit(Candidate::resolved(
            title,
            Some(app_id),
            GameType::SteamNative,
            sample,
        )),
        None => RuleOutcome::Pass,
    }
}

fn shortcut_rule(ctx: &RuleContext<'_>, sample: &ProcessSample) -> RuleOutcome {
    let Some(app_id) = extract_app_id(sample) else {
        return RuleOutcome::Pass;
    };
    match ctx.shortcuts.title_for_id(&app_id) {
        Some(title) => RuleOutcome::Emit(Candidate::resolved(
            title,
            Some(app_id),
            GameType::NonSteam,
            sample,
        )),
        None => RuleOutcome::Pass,
    }
}

fn rom_rule(ctx: &RuleContext<'_>, sample: &ProcessSample) -> RuleOutcome {
    let Some(caps) = ctx.rules.rom_path.captures(&sample.command_line) else {
        return RuleOutcome::Pass;
    };
    let name = bracket_tag_regex().replace_all(&caps[1], "");
    let name = collapse_whitespace(&name);
    if name.is_empty() {
        return RuleOutcome::Pass;
    }
    RuleOutcome::Emit(Candidate::unresolved(name, None, GameType::Rom, sample))
}

/// Emits the folder as a Steam title when an installed manifest claims it.
fn folder_candidate(
    ctx: &RuleContext<'_>,
    sample: &ProcessSample,
    folder: String,
    app_id: Option<String>,
) -> RuleOutcome {
    if let Some(entry) = ctx.manifests.entry_for_folder(&folder) {
        if appid::is_genuine_str(&entry.app_id) {
            return RuleOutcome::Emit(Candidate::resolved(
                entry.name.clone(),
                Some(entry.app_id.clone()),
                GameType::SteamNative,
                sample,
            ));
        }
    }
    RuleOutcome::Emit(Candidate::unresolved(folder, app_id, GameType::NonSteam, sample))
}

fn path_fallback_rule(ctx: &RuleContext<'_>, sample: &ProcessSample) -> RuleOutcome {
    if !ctx.rules.looks_like_game(&sample.command_line) {
        return RuleOutcome::Pass;
    }
    let app_id = extract_app_id(sample);

    if let Some(caps) = common_folder_regex().captures(&sample.command_line) {
        let folder = caps[1].trim().to_string();
        if !folder.is_empty() {
            return folder_candidate(ctx, sample, folder, app_id);
        }
    }

    let folder = longest_path(&sample.command_line)
        .and_then(|path| folder_from_path(ctx.rules, &path));
    match folder {
        Some(folder) => folder_candidate(ctx, sample, folder, app_id),
        None => RuleOutcome::Pass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use crate::shortcuts::ShortcutEntry;

    fn sample(command_line: &str) -> ProcessSample {
        ProcessSample {
            pid: 42,
            command_line: command_line.to_string(),
            env_app_id: None,
            cpu: 12.5,
            started_at: 1_700_000_000,
        }
    }

    struct Fixture {
        rules: RuleSet,
        manifests: ManifestIndex,
        shortcuts: ShortcutIndex,
    }

    impl Fixture {
        fn new() -> Self {
            let mut manifests = ManifestIndex::new();
            manifests.insert(ManifestEntry {
                app_id: "620".to_string(),
                name: "Portal 2".to_string(),
                install_dir: Some("Portal 2".to_string()),
            });
            let mut shortcuts = ShortcutIndex::new();
            shortcuts.insert(ShortcutEntry {
                runtime_id: Some("3000000001".to_string()),
                name: "Heroic Game".to_string(),
            });
            shortcuts.insert(ShortcutEntry {
                runtime_id: Some("3000000002".to_string()),
                name: "eXoDOS".to_string(),
            });
            Self {
                rules: RuleSet::compile(&ScannerRules::default()).unwrap(),
                manifests,
                shortcuts,
            }
        }

        fn classify(&self, sample: &ProcessSample) -> Option<(&'static str, RuleOutcome)> {
            let ctx = RuleContext {
                rules: &self.rules,
                manifests: &self.manifests,
                shortcuts: &self.shortcuts,
            };
            RULES
                .iter()
                .map(|(name, rule)| (*name, rule(&ctx, sample)))
                .find(|(_, outcome)| *outcome != RuleOutcome::Pass)
        }

        fn emitted(&self, command_line: &str) -> Option<(&'static str, Candidate)> {
            match self.classify(&sample(command_line))? {
                (name, RuleOutcome::Emit(c)) => Some((name, c)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_launch_wrapper_beats_ignore_list() {
        let fx = Fixture::new();
        let (rule, c) = fx
            .emitted("/home/deck/.local/share/Steam/ubuntu12_32/reaper SteamLaunch AppId=3000000001 -- /usr/bin/heroic")
            .unwrap();
        assert_eq!(rule, "launch-wrapper");
        assert_eq!(c.title, "Heroic Game");
        assert!(c.resolved);
        assert_eq!(c.game_type, GameType::NonSteam);
        assert_eq!(c.cpu, crate::model::SATURATED_CPU);
    }

    #[test]
    fn test_launch_wrapper_for_dos_frontend_is_ignored() {
        let fx = Fixture::new();
        let outcome = fx
            .classify(&sample("/opt/steam/reaper SteamLaunch AppId=3000000002 -- /opt/exogui"))
            .unwrap();
        assert_eq!(outcome, ("ignore-list", RuleOutcome::Drop));
    }

    #[test]
    fn test_dos_rule_strips_year() {
        let fx = Fixture::new();
        let (rule, c) = fx
            .emitted("/bin/bash /run/media/sd/eXoDOS/eXo/eXoDOS/!dos/Commander Keen (1990)/Commander Keen (1990).command")
            .unwrap();
        assert_eq!(rule, "dos-library");
        assert_eq!(c.title, "Commander Keen");
        assert!(!c.resolved);
        assert_eq!(c.game_type, GameType::ExoDos);
        assert_eq!(c.cpu, crate::model::SATURATED_CPU);
    }

    #[test]
    fn test_dos_rule_skips_frontend_script() {
        let fx = Fixture::new();
        assert!(fx.emitted("/bin/sh /home/deck/eXoDOS/exogui/launch.command").is_none());
    }

    #[test]
    fn test_ignore_list_drops() {
        let fx = Fixture::new();
        let outcome = fx
            .classify(&sample("/home/deck/.local/share/Steam/ubuntu12_64/steamwebhelper --type=gpu"))
            .unwrap();
        assert_eq!(outcome.1, RuleOutcome::Drop);
    }

    #[test]
    fn test_steam_native_from_environment() {
        let fx = Fixture::new();
        let mut s = sample("Z:\\some\\odd\\binary.exe");
        s.env_app_id = Some("620".to_string());
        let (rule, c) = match fx.classify(&s).unwrap() {
            (rule, RuleOutcome::Emit(c)) => (rule, c),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(rule, "steam-native");
        assert_eq!(c.title, "Portal 2");
        assert_eq!(c.app_id.as_deref(), Some("620"));
        assert_eq!(c.game_type, GameType::SteamNative);
    }

    #[test]
    fn test_shortcut_from_command_line_game_id() {
        let fx = Fixture::new();
        let game_id = (3_000_000_001u64 << 32) | 0x0200_0000;

        for command_line in [
            format!("/usr/bin/some-runner steam://rungameid/{}", game_id),
            format!("/usr/bin/some-runner SteamGameId={} -- game", game_id),
        ] {
            let (rule, c) = fx.emitted(&command_line).unwrap();
            assert_eq!(rule, "shortcut");
            assert_eq!(c.title, "Heroic Game");
            assert_eq!(c.app_id.as_deref(), Some("3000000001"));
            assert_eq!(c.game_type, GameType::NonSteam);
        }
    }

    #[test]
    fn test_command_line_app_id_matches_environment() {
        let game_id = (3_000_000_001u64 << 32) | 0x0200_0000;
        let var = format!("SteamGameId={}", game_id);
        let from_env = crate::scanner::app_id_from_environment([var.as_str()]);

        let from_cmd = extract_app_id(&sample(&format!("runner steam://rungameid/{}", game_id)));
        assert_eq!(from_cmd, from_env);
        assert_eq!(extract_app_id(&sample("runner steam://rungameid/620")).as_deref(), Some("620"));
        assert_eq!(extract_app_id(&sample("runner AppId=0")), None);
    }

    #[test]
    fn test_rom_rule_strips_tags() {
        let fx = Fixture::new();
        let (rule, c) = fx
            .emitted("/usr/bin/retroarch -L snes9x_libretro.so /home/deck/roms/snes/Super Mario World (USA) [!].sfc")
            .unwrap();
        assert_eq!(rule, "rom");
        assert_eq!(c.title, "Super Mario World");
        assert_eq!(c.game_type, GameType::Rom);
        assert!(!c.resolved);
    }

    #[test]
    fn test_rom_rule_prefers_longer_extension() {
        let fx = Fixture::new();
        let (_, c) = fx.emitted("mgba /home/deck/roms/gba/Metroid Fusion.gba").unwrap();
        assert_eq!(c.title, "Metroid Fusion");
    }

    #[test]
    fn test_common_folder_resolves_via_manifest() {
        let fx = Fixture::new();
        let (rule, c) = fx
            .emitted("/home/deck/.local/share/Steam/steamapps/common/Portal 2/portal2_linux -game portal2")
            .unwrap();
        assert_eq!(rule, "path-fallback");
        assert_eq!(c.title, "Portal 2");
        assert_eq!(c.app_id.as_deref(), Some("620"));
        assert!(c.resolved);
    }

    #[test]
    fn test_common_folder_without_manifest_is_unresolved() {
        let fx = Fixture::new();
        let (_, c) = fx
            .emitted("Z:\\home\\deck\\.local\\share\\Steam\\steamapps\\common\\Hades\\x64\\Hades.exe")
            .unwrap();
        assert_eq!(c.title, "Hades");
        assert!(!c.resolved);
        assert_eq!(c.game_type, GameType::NonSteam);
    }

    #[test]
    fn test_path_walk_skips_technical_folders() {
        let fx = Fixture::new();
        let (_, c) = fx
            .emitted("C:\\Games\\Hollow Knight\\1.5.78\\Binaries\\Win64\\hollow_knight.exe")
            .unwrap();
        assert_eq!(c.title, "Hollow Knight");
    }

    #[test]
    fn test_path_walk_on_unix_paths() {
        let fx = Fixture::new();
        let (_, c) = fx
            .emitted("/home/deck/Games/Celeste/bin/x86_64/Celeste.bin.x86_64 --fullscreen")
            .unwrap();
        assert_eq!(c.title, "Celeste");
    }

    #[test]
    fn test_non_game_process_passes_every_rule() {
        let fx = Fixture::new();
        assert!(fx.classify(&sample("/usr/bin/bash -c sleep 10")).is_none());
    }

    #[test]
    fn test_folder_from_path_rejects_everything() {
        let rules = RuleSet::compile(&ScannerRules::default()).unwrap();
        assert_eq!(folder_from_path(&rules, "/home/deck/.hidden/v2/x64/game.exe"), None);
        assert_eq!(
            folder_from_path(&rules, "/mnt/Stardew Valley/game.exe").as_deref(),
            Some("Stardew Valley")
        );
    }

    #[test]
    fn test_longest_path() {
        assert_eq!(
            longest_path(r"wine C:\Games\Tunic\Tunic.exe /tmp/x").as_deref(),
            Some("C:/Games/Tunic/Tunic.exe")
        );
        assert_eq!(longest_path("no paths here"), None);
    }

    #[test]
    fn test_empty_extension_lists_are_rejected() {
        let mut rules = ScannerRules::default();
        rules.rom_extensions.clear();
        assert!(RuleSet::compile(&rules).is_err());
    }
}
