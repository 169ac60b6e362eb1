use crate::config::EngineConfig;
use crate::detector::GameDetector;
use crate::manifest::{ManifestEntry, ManifestIndex};
use crate::model::{GameType, ProcessSample, ResolutionResult};
use crate::normalize::{normalize, title_case};
use crate::online::TitleSource;
use crate::scanner::StaticProcessSource;
use crate::shortcuts::{test_support, ShortcutIndex};
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::Cell;
use std::rc::Rc;

/// Answers nothing, counts every call.
struct CountingSource {
    calls: Rc<Cell<usize>>,
}

impl TitleSource for CountingSource {
    fn title_by_app_id(&self, _app_id: &str) -> Option<String> {
        self.calls.set(self.calls.get() + 1);
        None
    }

    fn search_title(&self, _term: &str) -> Option<String> {
        self.calls.set(self.calls.get() + 1);
        None
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
    calls: Rc<Cell<usize>>,
    detector: GameDetector,
}

impl Harness {
    fn new(shortcuts: ShortcutIndex) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap().to_path_buf();

        let config = EngineConfig {
            steam_roots: Vec::new(),
            cache_path: Some(root.join("game_cache.json")),
            audit_log_path: Some(root.join("deckmon.log")),
            ..Default::default()
        };

        let mut manifests = ManifestIndex::new();
        manifests.insert(ManifestEntry {
            app_id: "620".to_string(),
            name: "Portal 2".to_string(),
            install_dir: Some("Portal 2".to_string()),
        });

        let calls = Rc::new(Cell::new(0));
        let source = CountingSource {
            calls: calls.clone(),
        };
        let detector =
            GameDetector::from_parts(config, manifests, shortcuts, Box::new(source)).unwrap();

        Self {
            _dir: dir,
            root,
            calls,
            detector,
        }
    }

    fn detect(&self, command_lines: &[&str]) -> ResolutionResult {
        let samples = command_lines
            .iter()
            .enumerate()
            .map(|(i, cmd)| process(i as u32 + 100, cmd))
            .collect();
        self.detector.detect(&mut StaticProcessSource::new(samples))
    }
}

fn process(pid: u32, command_line: &str) -> ProcessSample {
    ProcessSample {
        pid,
        command_line: command_line.to_string(),
        env_app_id: None,
        cpu: 5.0,
        started_at: 1_700_000_000 + pid as u64,
    }
}

#[test]
fn test_steam_native_from_common_folder() {
    let harness = Harness::new(ShortcutIndex::new());
    let result = harness.detect(&[
        "/usr/lib/systemd/systemd --user",
        "Z:\\home\\deck\\.local\\share\\Steam\\steamapps\\common\\Portal 2\\portal2.exe -novid",
        "/home/deck/.local/share/Steam/steamapps/common/Portal 2/portal2.exe",
    ]);
    assert_eq!(
        result,
        ResolutionResult {
            title: "Portal 2".to_string(),
            app_id: Some("620".to_string()),
            game_type: GameType::SteamNative,
        }
    );
    assert_eq!(harness.calls.get(), 0);
}

#[test]
fn test_steam_native_from_environment() {
    let harness = Harness::new(ShortcutIndex::new());
    let mut sample = process(7, "/tmp/run/game.bin");
    sample.env_app_id = Some("620".to_string());

    let result = harness
        .detector
        .detect(&mut StaticProcessSource::new(vec![sample]));
    assert_eq!(result.title, "Portal 2");
    assert_eq!(result.game_type, GameType::SteamNative);
}

#[test]
fn test_rom_scenario() {
    let harness = Harness::new(ShortcutIndex::new());
    let hits = harness.detector.scan(&mut StaticProcessSource::new(vec![process(
        1,
        "/home/deck/roms/snes/Super Mario World (USA).sfc",
    )]));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].rule, "rom");
    assert_eq!(hits[0].candidate.title, "Super Mario World");
    assert_eq!(hits[0].candidate.game_type, GameType::Rom);

    let result = harness.detect(&["/home/deck/roms/snes/Super Mario World (USA).sfc"]);
    assert_eq!(result.title, "Super Mario World");
    assert_eq!(result.game_type, GameType::Rom);
    assert_eq!(result.app_id, None);
}

#[test]
fn test_empty_or_ignored_is_no_game() {
    let harness = Harness::new(ShortcutIndex::new());
    assert_eq!(harness.detect(&[]), ResolutionResult::no_game());
    assert_eq!(
        harness.detect(&[
            "/home/deck/.local/share/Steam/ubuntu12_64/steamwebhelper -lang=en_US",
            "/usr/bin/gamescope -w 1280 -h 800",
            "/usr/bin/plasmashell",
        ]),
        ResolutionResult::no_game()
    );

    let json = serde_json::to_string(&harness.detect(&[])).unwrap();
    assert_eq!(json, r#"{"title":"No game opened","appId":null,"gameType":"None"}"#);
}

#[test]
fn test_unknown_folder_falls_back_to_title_case() {
    let harness = Harness::new(ShortcutIndex::new());
    let result = harness.detect(&["/home/deck/Games/my_indie-game/run.sh"]);
    assert_eq!(result.title, title_case(&normalize("my_indie-game")));
    assert_eq!(result.title, "My Indie Game");
    assert_eq!(result.game_type, GameType::NonSteam);
    // One search attempt, no id lookup.
    assert_eq!(harness.calls.get(), 1);
}

#[test]
fn test_second_cycle_is_served_from_cache() {
    let harness = Harness::new(ShortcutIndex::new());
    let cmd = "/home/deck/Games/my_indie-game/run.sh";

    harness.detect(&[cmd]);
    let after_first = harness.calls.get();
    let result = harness.detect(&[cmd]);

    assert_eq!(result.title, "My Indie Game");
    assert_eq!(harness.calls.get(), after_first);
    let audit = std::fs::read_to_string(harness.root.join("deckmon.log").as_std_path()).unwrap();
    assert_eq!(audit.lines().filter(|l| l.contains("New entry:")).count(), 1);
    assert_eq!(audit.lines().filter(|l| l.contains("Detected: My Indie Game")).count(), 2);
}

#[test]
fn test_cached_title_wins_without_network() {
    let harness = Harness::new(ShortcutIndex::new());
    std::fs::write(
        harness.root.join("game_cache.json").as_std_path(),
        r#"{"my_indie-game": "Indie Deluxe"}"#,
    )
    .unwrap();

    let result = harness.detect(&["/home/deck/Games/my_indie-game/run.sh"]);
    assert_eq!(result.title, "Indie Deluxe");
    assert_eq!(harness.calls.get(), 0);
}

#[test]
fn test_corrupt_cache_recovers_from_backup() {
    let harness = Harness::new(ShortcutIndex::new());
    std::fs::write(harness.root.join("game_cache.json").as_std_path(), "{\"trunc").unwrap();
    std::fs::write(
        harness.root.join("game_cache.json.bak").as_std_path(),
        r#"{"my_indie-game": "Indie Deluxe"}"#,
    )
    .unwrap();

    let result = harness.detect(&["/home/deck/Games/my_indie-game/run.sh"]);
    assert_eq!(result.title, "Indie Deluxe");
    assert_eq!(harness.calls.get(), 0);
}

#[test]
fn test_shortcut_from_registry() {
    let dir = tempfile::tempdir().unwrap();
    let vdf = Utf8Path::from_path(dir.path()).unwrap().join("shortcuts.vdf");
    std::fs::write(
        vdf.as_std_path(),
        test_support::registry(&[(0x1234_5678, "Cave Story+"), (0x0BAD_F00D, "eXoDOS")]),
    )
    .unwrap();
    let shortcuts = ShortcutIndex::build(&[vdf]);
    let runtime_id = (0x1234_5678u32 | 0x8000_0000).to_string();

    let harness = Harness::new(shortcuts);
    let mut sample = process(9, "/home/deck/Games/CaveStory/CaveStory+");
    sample.env_app_id = Some(runtime_id.clone());
    let result = harness
        .detector
        .detect(&mut StaticProcessSource::new(vec![sample]));

    assert_eq!(result.title, "Cave Story+");
    assert_eq!(result.app_id.as_deref(), Some(runtime_id.as_str()));
    assert_eq!(result.game_type, GameType::NonSteam);
    assert_eq!(harness.calls.get(), 0);
}

#[test]
fn test_resolved_candidate_outranks_busy_unresolved() {
    let harness = Harness::new(ShortcutIndex::new());
    let mut busy = process(1, "/home/deck/Games/Busy Thing/busy.bin");
    busy.cpu = 95.0;
    let mut portal = process(2, "/home/deck/.local/share/Steam/steamapps/common/Portal 2/portal2_linux");
    portal.cpu = 3.0;

    let result = harness
        .detector
        .detect(&mut StaticProcessSource::new(vec![busy, portal]));
    assert_eq!(result.title, "Portal 2");
}

#[test]
fn test_dos_title_outranks_everything_unresolved() {
    let harness = Harness::new(ShortcutIndex::new());
    let mut busy = process(1, "/home/deck/Games/Busy Thing/busy.bin");
    busy.cpu = 95.0;
    let dos = process(
        2,
        "/bin/bash /run/media/deck/SD/eXoDOS/eXo/eXoDOS/Prince of Persia (1990)/Prince of Persia (1990).command",
    );

    let result = harness
        .detector
        .detect(&mut StaticProcessSource::new(vec![busy, dos]));
    assert_eq!(result.title, "Prince Of Persia");
    assert_eq!(result.game_type, GameType::ExoDos);
}

#[test]
fn test_rebuild_picks_up_new_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8Path::from_path(dir.path()).unwrap().to_path_buf();
    let steam = root.join("steam");
    std::fs::create_dir_all(steam.join("steamapps").as_std_path()).unwrap();

    let mut config = EngineConfig {
        steam_roots: vec![steam.clone()],
        cache_path: Some(root.join("game_cache.json")),
        audit_log_path: Some(root.join("deckmon.log")),
        ..Default::default()
    };
    config.online.enabled = false;

    let mut detector = GameDetector::new(config).unwrap();
    assert!(detector.manifests().title_for_app_id("1145360").is_none());

    std::fs::write(
        steam.join("steamapps/appmanifest_1145360.acf").as_std_path(),
        "\"AppState\"\n{\n\t\"appid\"\t\"1145360\"\n\t\"name\"\t\"Hades\"\n\t\"installdir\"\t\"Hades\"\n}\n",
    )
    .unwrap();
    detector.rebuild_indexes();
    assert_eq!(detector.manifests().title_for_app_id("1145360"), Some("Hades"));

    let result = detector.detect(&mut StaticProcessSource::new(vec![process(
        3,
        "/home/deck/.local/share/Steam/steamapps/common/Hades/Hades.bin",
    )]));
    assert_eq!(result.title, "Hades");
    assert_eq!(result.app_id.as_deref(), Some("1145360"));
    assert_eq!(result.game_type, GameType::SteamNative);
}
