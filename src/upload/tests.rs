use heapless::Deque;

use super::{format_request, parse_upload_name, UploadError, UploadResponse, UploadSession, UploadStep};
use crate::{
    config::{FsConfig, SECTOR_SIZE},
    error::FsError,
    flash::ram::RamFlash,
    fs::Fs,
};

const CONFIG: FsConfig = FsConfig::new(1, 4);

fn formatted(mem: &mut [u8]) -> Fs<RamFlash<'_>> {
    let mut fs = Fs::new(RamFlash::erased(mem), CONFIG).unwrap();
    fs.format().unwrap();
    fs
}

#[test]
fn upload_names_come_from_the_fs_root() {
    assert_eq!(parse_upload_name("/fs/photo.bin"), Ok("photo.bin"));
    assert_eq!(parse_upload_name("/fs/log.txt?overwrite=1"), Ok("log.txt"));
    for bad in ["/fs/", "/fs", "/files/a", "/fs/a/b", "/fs/..", "fs/a", "/fsa"] {
        assert_eq!(parse_upload_name(bad), Err(UploadError::InvalidPath), "{bad}");
    }
}

#[test]
fn body_arriving_in_pieces_lands_in_one_file() {
    let mut mem = vec![0u8; CONFIG.required_bytes()];
    let mut fs = formatted(&mut mem);
    let mut session = UploadSession::new();
    let mut queue: Deque<u8, 512> = Deque::new();

    for round in 0..10u8 {
        for _ in 0..500 {
            queue.push_back(round).unwrap();
        }
        let step = session.feed(&mut fs, "/fs/up.bin", &mut queue, round < 9).unwrap();
        assert!(queue.is_empty());
        if round < 9 {
            assert!(matches!(step, UploadStep::More));
            assert_eq!(session.written(), (round as u32 + 1) * 500);
        } else {
            let UploadStep::Done(response, info) = step else {
                panic!("expected completion, got {:?}", step);
            };
            assert_eq!(response, UploadResponse::DONE);
            assert_eq!(info.size, 5000);
            assert_eq!(info.nodes, 2);
        }
    }
    assert!(!session.is_open());

    let mut back = [0u8; 2];
    fs.read("up.bin", 4499, &mut back).unwrap();
    assert_eq!(back, [8, 9]);
}

#[test]
fn duplicate_upload_is_a_conflict() {
    let mut mem = vec![0u8; CONFIG.required_bytes()];
    let mut fs = formatted(&mut mem);
    fs.create("dup").unwrap();

    let mut session = UploadSession::new();
    let err = session
        .feed(&mut fs, "/fs/dup", &mut &b"body"[..], false)
        .unwrap_err();

    assert_eq!(err, UploadError::Fs(FsError::FileExists));
    assert_eq!(err.status(), b"409 Conflict");
    assert!(!session.is_open());
}

#[test]
fn full_store_reports_insufficient_storage() {
    let mut mem = vec![0u8; CONFIG.required_bytes()];
    let mut fs = formatted(&mut mem);
    let body = vec![0x11u8; 5 * SECTOR_SIZE];

    let mut session = UploadSession::new();
    let err = session
        .feed(&mut fs, "/fs/huge", &mut body.as_slice(), false)
        .unwrap_err();

    assert_eq!(err, UploadError::Fs(FsError::NoSpace));
    assert_eq!(err.response().status, b"507 Insufficient Storage");
    assert!(!session.is_open());
    assert_eq!(fs.stat("huge").unwrap().size, 4 * SECTOR_SIZE as u32);
}

#[test]
fn abort_keeps_committed_bytes() {
    let mut mem = vec![0u8; CONFIG.required_bytes()];
    let mut fs = formatted(&mut mem);
    let mut session = UploadSession::new();

    session
        .feed(&mut fs, "/fs/partial", &mut &b"first half"[..], true)
        .unwrap();
    assert!(session.is_open());
    session.abort();

    assert!(!session.is_open());
    assert_eq!(session.written(), 0);
    assert_eq!(fs.stat("partial").unwrap().size, 10);
}

#[test]
fn format_request_wipes_the_table() {
    let mut mem = vec![0u8; CONFIG.required_bytes()];
    let mut fs = formatted(&mut mem);
    fs.create("old").unwrap();

    assert_eq!(format_request(&mut fs), Ok(UploadResponse::FORMATTED));
    assert_eq!(fs.stat("old").unwrap_err(), FsError::NotFound);
}

#[test]
fn invalid_path_is_a_bad_request() {
    let err = UploadError::InvalidPath;
    assert_eq!(err.status(), b"400 Bad Request");
    assert_eq!(
        UploadError::Fs(FsError::BrokenChain { id: 3 }).status(),
        b"500 Internal Server Error"
    );
}
