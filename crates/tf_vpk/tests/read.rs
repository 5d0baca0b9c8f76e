mod common;

use miette::{IntoDiagnostic, Result};
use pretty_assertions::assert_eq;
use tf_vpk::{
    error::{ArchiveError, EntryNotFoundError},
    VpkArchive,
};
use tracing_test::traced_test;

use common::{crc32, effect_payload, mixed_archive, Location, VpkFixture};

#[traced_test]
#[test]
fn open_and_list_entries() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;

    assert_eq!(vpk.len(), 6);
    assert_eq!(vpk.header().version, 2);
    assert_eq!(
        vpk.file_names().collect::<Vec<_>>(),
        vec![
            "a.pcf",
            "c.pcf",
            "particles/effect.pcf",
            "particles/split.pcf",
            "b.txt",
            "materials/models/hat.vmt",
        ]
    );

    Ok(())
}

#[traced_test]
#[test]
fn find_every_entry() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;

    let names = vpk.file_names().map(str::to_owned).collect::<Vec<_>>();
    for name in names {
        let entry = vpk.by_name(&name)?;
        assert_eq!(&*entry.path, name.as_str());
        assert!(vpk.verify(&entry)?, "{name} should match its recorded crc");
    }

    let effect = vpk.by_name("particles/effect.pcf")?;
    assert_eq!(effect.total_size(), 1024);
    assert_eq!(effect.crc32, crc32(&effect_payload()));
    assert_eq!(vpk.read(&effect)?, effect_payload());

    Ok(())
}

#[test]
fn lookup_normalizes_separators() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;

    assert!(vpk.find("/particles\\effect.pcf").is_some());
    assert!(vpk.find("PARTICLES/effect.pcf").is_none());
    assert!(matches!(
        vpk.by_name("particles/missing.pcf"),
        Err(ArchiveError::EntryNotFound(EntryNotFoundError::Path(_)))
    ));

    Ok(())
}

#[test]
fn read_split_and_inline_payloads() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;

    let split = vpk.by_name("particles/split.pcf")?;
    assert_eq!(split.preload_length, 4);
    assert_eq!(split.archive_index, 1);
    assert_eq!(vpk.read(&split)?, b"0123456789");

    let hat = vpk.by_name("materials/models/hat.vmt")?;
    assert!(hat.is_inline());
    assert_eq!(vpk.read(&hat)?, b"\"VertexLitGeneric\"\n{\n}\n");

    Ok(())
}

#[test]
fn glob_matches_in_tree_order() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let path = VpkFixture::new(1)
        .entry("a.pcf", b"a".to_vec())
        .entry("b.txt", b"b".to_vec())
        .entry("c.pcf", b"c".to_vec())
        .write(dir.path(), "pak01");
    let vpk = VpkArchive::open(&path)?;

    for _ in 0..3 {
        assert_eq!(vpk.find_by_glob("*.pcf")?.collect::<Vec<_>>(), vec!["a.pcf", "c.pcf"]);
    }
    assert_eq!(vpk.find_by_glob("*.vmt")?.count(), 0);

    Ok(())
}

#[test]
fn glob_crosses_directories() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;

    assert_eq!(
        vpk.find_by_glob("particles/*")?.collect::<Vec<_>>(),
        vec!["particles/effect.pcf", "particles/split.pcf"]
    );
    assert_eq!(vpk.find_by_glob("*.pcf")?.count(), 4);
    assert!(matches!(
        vpk.find_by_glob("[").map(|matches| matches.count()),
        Err(ArchiveError::InvalidPattern { .. })
    ));

    Ok(())
}

#[test]
fn find_file_path_by_name() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;

    assert_eq!(vpk.find_file_path("hat.vmt"), Some("materials/models/hat.vmt"));
    assert_eq!(vpk.find_file_path("effect.pcf"), Some("particles/effect.pcf"));
    assert_eq!(vpk.find_file_path("hat"), None);

    Ok(())
}

#[test]
fn reject_non_vpk_files() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;

    let garbage = dir.path().join("garbage_dir.vpk");
    std::fs::write(&garbage, b"TREE0005 definitely not a vpk").into_diagnostic()?;
    assert!(matches!(
        VpkArchive::open(&garbage),
        Err(ArchiveError::SignatureMismatch { .. })
    ));

    let short = dir.path().join("short_dir.vpk");
    std::fs::write(&short, [0x34, 0x12]).into_diagnostic()?;
    assert!(matches!(
        VpkArchive::open(&short),
        Err(ArchiveError::SignatureMismatch { .. })
    ));

    Ok(())
}

#[test]
fn reject_unknown_version() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let path = VpkFixture::new(3)
        .entry("a.pcf", b"a".to_vec())
        .write(dir.path(), "pak01");

    assert!(matches!(
        VpkArchive::open(&path),
        Err(ArchiveError::UnsupportedVersion { version: 3, .. })
    ));

    Ok(())
}

#[test]
fn reject_data_past_end_of_part() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let path = VpkFixture::new(1)
        .entry("a.pcf", b"abcdef".to_vec())
        .write(dir.path(), "pak01");
    std::fs::write(dir.path().join("pak01_000.vpk"), b"abc").into_diagnostic()?;

    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("a.pcf")?;
    assert!(matches!(
        vpk.read(&entry),
        Err(ArchiveError::CorruptDirectory(_))
    ));

    Ok(())
}

#[test]
fn references_do_not_outlive_their_archive() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let first = VpkArchive::open(&path)?;
    let second = VpkArchive::open(&path)?;

    let entry = first.by_name("a.pcf")?;
    assert_eq!(first.read(&entry)?, b"pcf-a");
    assert!(matches!(
        second.read(&entry),
        Err(ArchiveError::EntryNotFound(EntryNotFoundError::Stale(_)))
    ));

    Ok(())
}

#[test]
fn version_one_inline_entries() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let path = VpkFixture::new(1)
        .entry_with("cfg/valve.rc", b"exec autoexec\n".to_vec(), 5, Location::Inline)
        .write(dir.path(), "pak01");
    let vpk = VpkArchive::open(&path)?;

    let entry = vpk.by_name("cfg/valve.rc")?;
    assert_eq!(entry.preload_length, 5);
    assert_eq!(vpk.read(&entry)?, b"exec autoexec\n");

    Ok(())
}
