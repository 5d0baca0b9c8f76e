mod common;

use miette::{IntoDiagnostic, Result};
use pretty_assertions::assert_eq;
use tf_vpk::{error::ArchiveError, ArchiveOptions, PaddingPolicy, VpkArchive};
use tracing_test::traced_test;

use common::{crc32, effect_payload, mixed_archive, Location, VpkFixture};

fn snapshot(dir: &std::path::Path) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = std::fs::read_dir(dir)
        .into_diagnostic()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| {
            let bytes = std::fs::read(entry.path()).into_diagnostic()?;
            Ok((entry.file_name().to_string_lossy().into_owned(), bytes))
        })
        .collect::<Result<Vec<_>>>()?;
    files.sort();
    Ok(files)
}

#[traced_test]
#[test]
fn patch_with_identical_bytes_changes_nothing() -> Result<()> {
    let (dir, path) = mixed_archive();
    let before = snapshot(dir.path())?;

    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("particles/effect.pcf")?;
    vpk.patch(&entry, &effect_payload(), false)?;

    assert_eq!(snapshot(dir.path())?, before);
    assert!(vpk.verify(&entry)?);

    Ok(())
}

#[traced_test]
#[test]
fn patch_pads_shorter_payload_in_place() -> Result<()> {
    let (dir, path) = mixed_archive();
    let before = snapshot(dir.path())?;

    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("particles/effect.pcf")?;

    let mut replacement = vec![b'y'; 1000];
    replacement[999] = b'}';
    vpk.patch_with(&entry, &replacement, false, PaddingPolicy::default())?;

    let actual = vpk.read(&entry)?;
    assert_eq!(actual.len(), 1024);
    assert_eq!(&actual[..999], &replacement[..999]);
    assert_eq!(&actual[999..1023], &[b' '; 24][..]);
    assert_eq!(actual[1023], b'}');

    // only the entry's own 1024 bytes in the data part changed
    let after = snapshot(dir.path())?;
    for ((name, old), (_, new)) in before.iter().zip(&after) {
        if name != "tf2_misc_000.vpk" {
            assert_eq!(old, new, "{name} should be untouched");
            continue;
        }
        assert_eq!(old.len(), new.len());
        let changed = old
            .iter()
            .zip(new)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(offset, _)| offset)
            .collect::<Vec<_>>();
        assert!(changed.iter().all(|offset| (10..1034).contains(offset)));
    }

    assert!(logs_contain("padding payload"));
    assert!(!vpk.verify(&entry)?, "crc in the directory is not rewritten");

    Ok(())
}

#[test]
fn patch_rejects_larger_payload_without_writing() -> Result<()> {
    let (dir, path) = mixed_archive();
    let before = snapshot(dir.path())?;

    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("a.pcf")?;
    let result = vpk.patch(&entry, b"pcf-a plus more", true);

    assert!(matches!(
        result,
        Err(ArchiveError::PayloadTooLarge { overflow: 10, .. })
    ));
    assert_eq!(snapshot(dir.path())?, before);
    assert!(!dir.path().join("tf2_misc_dir.backup").exists());

    Ok(())
}

#[test]
fn patch_splits_preload_and_data() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("particles/split.pcf")?;

    vpk.patch(&entry, b"abcdefghij", false)?;
    assert_eq!(vpk.read(&entry)?, b"abcdefghij");

    // reopening sees the same bytes, the tree itself did not move
    let reopened = VpkArchive::open(&path)?;
    let entry = reopened.by_name("particles/split.pcf")?;
    assert_eq!(entry.preload_length, 4);
    assert_eq!(reopened.read(&entry)?, b"abcdefghij");
    assert_eq!(reopened.read(&reopened.by_name("b.txt")?)?, b"readme\n");

    Ok(())
}

#[test]
fn patch_inline_entry() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("materials/models/hat.vmt")?;

    vpk.patch(&entry, b"\"UnlitGeneric\"\n{\n}\n", false)?;

    let actual = vpk.read(&entry)?;
    assert_eq!(actual, b"\"UnlitGeneric\"\n{\n}    \n");

    Ok(())
}

#[test]
fn patch_writes_backup_first() -> Result<()> {
    let (dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("particles/split.pcf")?;

    vpk.patch(&entry, b"9876543210", true)?;

    let backup = vpk.backup_path(&entry)?;
    assert_eq!(
        backup,
        dir.path()
            .join("tf2_misc_dir.backup")
            .join("particles")
            .join("split.pcf")
    );
    assert_eq!(std::fs::read(&backup).into_diagnostic()?, b"0123456789");
    assert_eq!(vpk.read(&entry)?, b"9876543210");

    Ok(())
}

#[test]
fn patch_backup_into_configured_directory() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let backups = tempfile::tempdir().into_diagnostic()?;
    let options = ArchiveOptions::builder()
        .backup_dir(backups.path().to_path_buf())
        .build();
    let vpk = VpkArchive::open_with(&path, options)?;
    let entry = vpk.by_name("a.pcf")?;

    vpk.patch(&entry, b"PCF-A", true)?;

    assert_eq!(
        std::fs::read(backups.path().join("a.pcf")).into_diagnostic()?,
        b"pcf-a"
    );

    Ok(())
}

#[test]
fn patch_respects_padding_overrides() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let options = ArchiveOptions::default()
        .with_padding_for("pcf", PaddingPolicy::Trailing { filler: 0 })
        .with_padding_for("txt", PaddingPolicy::Exact);
    let vpk = VpkArchive::open_with(&path, options)?;

    let pcf = vpk.by_name("c.pcf")?;
    vpk.patch(&pcf, b"pcf", false)?;
    assert_eq!(vpk.read(&pcf)?, b"pcf\0\0");

    let txt = vpk.by_name("b.txt")?;
    assert!(matches!(
        vpk.patch(&txt, b"short", false),
        Err(ArchiveError::PaddingRejected { missing: 2, .. })
    ));
    assert_eq!(vpk.read(&txt)?, b"readme\n");

    Ok(())
}

#[test]
fn patch_then_verify_against_fresh_crc() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let path = VpkFixture::new(2)
        .entry_with("scripts/items.txt", b"\"items\" {}".to_vec(), 2, Location::Part(3))
        .write(dir.path(), "pak01");

    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("scripts/items.txt")?;
    assert_eq!(entry.crc32, crc32(b"\"items\" {}"));

    vpk.patch(&entry, b"\"ITEMS\" {}", false)?;
    assert!(!vpk.verify(&entry)?);
    assert_eq!(crc32(&vpk.read(&entry)?), crc32(b"\"ITEMS\" {}"));

    Ok(())
}

#[test]
fn padding_keeps_the_replacement_last_byte() -> Result<()> {
    let (_dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("b.txt")?;

    vpk.patch(&entry, b"abc;", false)?;

    let actual = vpk.read(&entry)?;
    assert_eq!(actual, b"abc   ;");
    assert_ne!(actual.last(), Some(&b'\n'));

    Ok(())
}

#[test]
fn failed_backup_aborts_patch() -> Result<()> {
    let (dir, path) = mixed_archive();
    let blocker = dir.path().join("not_a_directory");
    std::fs::write(&blocker, b"").into_diagnostic()?;
    let options = ArchiveOptions::builder()
        .backup_dir(blocker.join("backups"))
        .build();
    let vpk = VpkArchive::open_with(&path, options)?;
    let entry = vpk.by_name("a.pcf")?;
    let before = snapshot(dir.path())?;

    let result = vpk.patch(&entry, b"PCF-A", true);

    assert!(matches!(result, Err(ArchiveError::Io { .. })));
    assert_eq!(snapshot(dir.path())?, before);
    assert_eq!(vpk.read(&entry)?, b"pcf-a");

    Ok(())
}

#[test]
fn unwritable_data_part_leaves_preload_untouched() -> Result<()> {
    let (dir, path) = mixed_archive();
    let vpk = VpkArchive::open(&path)?;
    let entry = vpk.by_name("particles/split.pcf")?;

    let part = dir.path().join("tf2_misc_001.vpk");
    std::fs::remove_file(&part).into_diagnostic()?;
    std::fs::create_dir(&part).into_diagnostic()?;
    let directory_before = std::fs::read(&path).into_diagnostic()?;

    let result = vpk.patch(&entry, b"abcdefghij", false);

    assert!(result.is_err());
    assert_eq!(std::fs::read(&path).into_diagnostic()?, directory_before);

    Ok(())
}
