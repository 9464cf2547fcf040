//! The `chime packs` command: list installed packs and install new ones
//! from the download registry.

use std::path::Path;

use tracing::debug;

use crate::cli::PacksCommands;
use crate::error::CliError;

/// A downloadable sound pack: its slug, display name, embedded manifest,
/// and the sound files it fetches (destination name, direct-download URL).
struct RemotePack {
    slug: &'static str,
    display_name: &'static str,
    manifest: &'static str,
    sounds: &'static [(&'static str, &'static str)],
}

/// Packs available via `chime packs install`. All URLs are direct file
/// downloads.
const REGISTRY: &[RemotePack] = &[
    RemotePack {
        slug: "arcademix",
        display_name: "Arcade Mix",
        manifest: include_str!("../../manifests/arcademix.json"),
        sounds: &[
            (
                "smb_powerup.wav",
                "https://themushroomkingdom.net/sounds/wav/smb/smb_powerup.wav",
            ),
            (
                "smb_stage_clear.wav",
                "https://themushroomkingdom.net/sounds/wav/smb/smb_stage_clear.wav",
            ),
            (
                "smb_coin.wav",
                "https://themushroomkingdom.net/sounds/wav/smb/smb_coin.wav",
            ),
            (
                "smb_mariodie.wav",
                "https://themushroomkingdom.net/sounds/wav/smb/smb_mariodie.wav",
            ),
            (
                "smb_warning.wav",
                "https://themushroomkingdom.net/sounds/wav/smb/smb_warning.wav",
            ),
            (
                "smb_breakblock.wav",
                "https://themushroomkingdom.net/sounds/wav/smb/smb_breakblock.wav",
            ),
            (
                "loz_get_item.wav",
                "https://noproblo.dayjo.org/zeldasounds/LOZ/LOZ_Get_Item.wav",
            ),
            (
                "loz_secret.wav",
                "https://noproblo.dayjo.org/zeldasounds/LOZ/LOZ_Secret.wav",
            ),
        ],
    },
    RemotePack {
        slug: "mortalkombat",
        display_name: "Mortal Kombat",
        manifest: include_str!("../../manifests/mortalkombat.json"),
        sounds: &[
            (
                "mk1-fight.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/announcer/mk1-00368.mp3",
            ),
            (
                "mk1-fatality.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/announcer/mk1-00375.mp3",
            ),
            (
                "mk1-flawless.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/announcer/mk1-00376.mp3",
            ),
            (
                "mk1-excellent.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/announcer/mk1-00377.mp3",
            ),
            (
                "mk1-testyourmight.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/announcer/mk1-00381.mp3",
            ),
            (
                "mk1-hit1.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/hitsounds/mk1-00048.mp3",
            ),
            (
                "mk1-hit2.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/hitsounds/mk1-00049.mp3",
            ),
            (
                "mk1-hit3.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/hitsounds/mk1-00050.mp3",
            ),
            (
                "mk1-hit4.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/hitsounds/mk1-00051.mp3",
            ),
            (
                "mk1-spear.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/specialfx/mk1-00151.mp3",
            ),
            (
                "mk1-getoverhere.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/scorpion/mk1-goh.mp3",
            ),
            (
                "mk1-explosion.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/explosions/mk1-00085.mp3",
            ),
            (
                "mk1-music-cue1.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/musiccues/mk1-00016.mp3",
            ),
            (
                "mk1-insertcoin.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/ui/mk1-00168.mp3",
            ),
            (
                "mk1-ui1.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/ui/mk1-00163.mp3",
            ),
            (
                "mk1-ui2.mp3",
                "https://www.mortalkombatwarehouse.com/mk1/sounds/ui/mk1-00164.mp3",
            ),
        ],
    },
];

/// Run a `chime packs` subcommand; plain `chime packs` lists.
pub async fn run(command: Option<&PacksCommands>) -> Result<(), CliError> {
    let packs_dir = chime_config::default_packs_dir();
    match command {
        None | Some(PacksCommands::List) => list(&packs_dir),
        Some(PacksCommands::Install { name }) => install(name, &packs_dir).await,
    }
}

/// Print installed packs and the registry entries not yet installed.
fn list(packs_dir: &Path) -> Result<(), CliError> {
    let installed = chime_packs::list_packs(packs_dir).unwrap_or_default();

    if installed.is_empty() {
        println!("No sound packs installed yet.");
    } else {
        println!("Installed sound packs:");
        for pack in &installed {
            println!("  {:<16} {}", pack.name, pack.description);
        }
    }

    let available: Vec<&RemotePack> = REGISTRY
        .iter()
        .filter(|remote| !installed.iter().any(|p| p.slug == remote.slug))
        .collect();
    if !available.is_empty() {
        println!("\nAvailable for install:");
        for remote in available {
            println!("  {:<16} {}", remote.slug, remote.display_name);
        }
    }

    Ok(())
}

/// Download a registry pack into `packs_dir/<slug>/`.
///
/// Files already on disk are kept; individual download failures are
/// reported and skipped so a flaky mirror does not abort the rest.
async fn install(name: &str, packs_dir: &Path) -> Result<(), CliError> {
    let Some(pack) = REGISTRY.iter().find(|remote| remote.slug == name) else {
        return Err(CliError::UnknownPack {
            name: name.to_string(),
            available: REGISTRY
                .iter()
                .map(|remote| remote.slug)
                .collect::<Vec<_>>()
                .join(", "),
        });
    };

    let pack_dir = packs_dir.join(pack.slug);
    tokio::fs::create_dir_all(&pack_dir).await?;
    tokio::fs::write(pack_dir.join("pack.json"), pack.manifest).await?;

    println!("Installing {} sound pack...", pack.display_name);
    println!("Downloading {} sounds", pack.sounds.len());

    for (file, url) in pack.sounds {
        let dest = pack_dir.join(file);
        if tokio::fs::try_exists(&dest).await? {
            println!("  [skip] {file} (already exists)");
            continue;
        }

        match download(url, &dest).await {
            Ok(()) => println!("  [download] {file} ... ok"),
            Err(e) => {
                debug!(url, error = %e, "sound download failed");
                println!("  [download] {file} ... FAILED: {e}");
            }
        }
    }

    println!(
        "\n{} pack installed! Select it in the chime UI or set:",
        pack.display_name
    );
    println!(
        "  \"activePack\": \"{}\" in {}",
        pack.slug,
        chime_config::default_path().display()
    );
    Ok(())
}

/// Fetch `url` and write the body to `dest`.
async fn download(url: &str, dest: &Path) -> Result<(), CliError> {
    let failed = |reason: String| CliError::Download {
        url: url.to_string(),
        reason,
    };

    let response = reqwest::get(url).await.map_err(|e| failed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let body = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    tokio::fs::write(dest, &body).await?;
    Ok(())
}
