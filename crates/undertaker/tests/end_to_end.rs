//! Write a will, preview it, and export it through the public API.

use std::sync::Mutex;

use async_trait::async_trait;
use undertaker::export::{EmailMessage, EmailSender, Mailer};
use undertaker::{
    load_preview, CaptureForm, DateStyle, PreviewPage, PreviewState, Result, Session,
    SqliteStore, WillForm,
};

#[derive(Debug, Default)]
struct Outbox {
    sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for Outbox {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn jane() -> WillForm {
    WillForm::new("Jane Doe", "1990-01-01", "Take care of the cat.")
}

#[tokio::test]
async fn write_preview_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("data").join("wills.db")).unwrap();
    let session = Session::new("u1");

    let mut form = CaptureForm::with_fields(jane());
    let id = form.submit(Some(&session), &store).await.unwrap();

    let record = store.find(id).unwrap().unwrap();
    assert_eq!(record.user_id, "u1");
    assert_eq!(store.count_owned_by("u1").unwrap(), 1);

    let state = load_preview(Some(&session), &store, DateStyle::Us).await;
    let view = state.view().cloned().unwrap();
    assert_eq!(view.full_name, "Jane Doe");
    assert_eq!(view.date_of_birth, "1/1/1990");
    assert_eq!(view.message, "Take care of the cat.");

    let mut page = PreviewPage::new(view, 90);
    let pdf_path = dir.path().join("digital-will.pdf");
    let notice = page.download(&pdf_path).await;
    assert!(!notice.is_error(), "{notice}");
    assert!(std::fs::read(&pdf_path).unwrap().starts_with(b"%PDF-"));

    let sender = EmailSender::new(Outbox::default(), "Undertaker App", 90);
    page.set_recipient("bob@example.com");
    let notice = page.send(&sender).await;
    assert!(!notice.is_error(), "{notice}");

    let sent = sender.mailer().sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message, "Digital Will for Jane Doe");
}

#[tokio::test]
async fn signed_out_user_cannot_write_or_preview() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut form = CaptureForm::with_fields(jane());
    let err = form.submit(None, &store).await.unwrap_err();
    assert!(err.is_not_authenticated());
    assert_eq!(store.stats().unwrap().total_wills, 0);

    let state = load_preview(None, &store, DateStyle::Us).await;
    assert_eq!(
        state,
        PreviewState::Error("Please sign in to view your will".to_string())
    );
}

#[tokio::test]
async fn preview_is_scoped_to_the_owner() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut form = CaptureForm::with_fields(jane());
    form.submit(Some(&Session::new("u1")), &store).await.unwrap();

    let state = load_preview(Some(&Session::new("u2")), &store, DateStyle::Us).await;
    assert_eq!(state, PreviewState::NotFound);
}

#[tokio::test]
async fn store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wills.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        let mut form = CaptureForm::with_fields(jane());
        form.submit(Some(&Session::new("u1")), &store).await.unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let state = load_preview(Some(&Session::new("u1")), &store, DateStyle::Iso).await;
    assert_eq!(state.view().unwrap().date_of_birth, "1990-01-01");
}
