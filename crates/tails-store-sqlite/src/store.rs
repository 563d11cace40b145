//! [`SqliteStore`], the SQLite implementation of [`TailsStore`].

use std::path::Path;

use tails_core::{
  admin::DashboardCounts,
  adoption::{
    AdoptionRequest, ApplicationSummary, IncomingApplication, RequestStatus,
  },
  listing::{Adoptable, AdoptableUpdate, ListingQuery, NewAdoptable, Page},
  message::Message,
  meta::{PetBreed, PetType},
  pet::{
    HealthStat, MedicalFile, NewHealthStat, NewMedicalFile, NewPet, Pet,
    PetUpdate, StatMetric,
  },
  store::TailsStore,
  user::{Credentials, NewUser, ProfileInput, User, UserProfile},
};

use crate::{
  Error, Result, admin, adoption, listings, messages, meta, pets,
  schema::SCHEMA, users,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Happy Tails store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection handle is reference-counted and
/// every call is serialised onto the connection's worker thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store. Used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a synchronous store operation on the connection thread.
  async fn run<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── TailsStore impl ─────────────────────────────────────────────────────────

impl TailsStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    self.run(move |conn| users::create(conn, input)).await
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    self.run(move |conn| users::get(conn, id)).await
  }

  async fn credentials_by_email(&self, email: String) -> Result<Option<Credentials>> {
    self.run(move |conn| users::credentials_by_email(conn, &email)).await
  }

  async fn find_or_create_google_user(
    &self,
    google_sub: String,
    email: String,
    name: String,
  ) -> Result<User> {
    self
      .run(move |conn| users::find_or_create_google(conn, &google_sub, &email, &name))
      .await
  }

  async fn get_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
    self.run(move |conn| users::get_profile(conn, user_id)).await
  }

  async fn upsert_profile(&self, user_id: i64, input: ProfileInput) -> Result<UserProfile> {
    self.run(move |conn| users::upsert_profile(conn, user_id, input)).await
  }

  // ── Reference metadata ────────────────────────────────────────────────

  async fn list_types(&self) -> Result<Vec<PetType>> {
    self.run(|conn| meta::list_types(conn)).await
  }

  async fn list_breeds(&self, type_id: Option<i64>) -> Result<Vec<PetBreed>> {
    self.run(move |conn| meta::list_breeds(conn, type_id)).await
  }

  async fn create_type(&self, name: String) -> Result<PetType> {
    self.run(move |conn| meta::create_type(conn, &name)).await
  }

  async fn create_breed(&self, type_id: i64, name: String) -> Result<PetBreed> {
    self.run(move |conn| meta::create_breed(conn, type_id, &name)).await
  }

  async fn delete_type(&self, id: i64) -> Result<()> {
    self.run(move |conn| meta::delete_type(conn, id)).await
  }

  async fn delete_breed(&self, id: i64) -> Result<()> {
    self.run(move |conn| meta::delete_breed(conn, id)).await
  }

  // ── Listings ──────────────────────────────────────────────────────────

  async fn create_adoptable(
    &self,
    caretaker_id: i64,
    input: NewAdoptable,
    images: Vec<String>,
  ) -> Result<Adoptable> {
    self
      .run(move |conn| listings::create(conn, caretaker_id, input, images))
      .await
  }

  async fn get_adoptable(&self, id: i64) -> Result<Option<Adoptable>> {
    self.run(move |conn| listings::get(conn, id)).await
  }

  async fn search_adoptables<'a>(&'a self, query: &'a ListingQuery) -> Result<Page<Adoptable>> {
    let query = query.clone();
    self.run(move |conn| listings::search(conn, &query)).await
  }

  async fn list_adoptables_by_caretaker(&self, caretaker_id: i64) -> Result<Vec<Adoptable>> {
    self.run(move |conn| listings::by_caretaker(conn, caretaker_id)).await
  }

  async fn update_adoptable(
    &self,
    caretaker_id: i64,
    id: i64,
    update: AdoptableUpdate,
  ) -> Result<Adoptable> {
    self
      .run(move |conn| listings::update(conn, caretaker_id, id, update))
      .await
  }

  async fn add_adoptable_images(
    &self,
    caretaker_id: i64,
    id: i64,
    images: Vec<String>,
  ) -> Result<Adoptable> {
    self
      .run(move |conn| listings::add_images(conn, caretaker_id, id, images))
      .await
  }

  async fn delete_adoptable(&self, caretaker_id: i64, id: i64) -> Result<Vec<String>> {
    self.run(move |conn| listings::delete(conn, caretaker_id, id)).await
  }

  // ── Adoption requests ─────────────────────────────────────────────────

  async fn apply(
    &self,
    adopter_id: i64,
    adoptable_id: i64,
    message: String,
  ) -> Result<AdoptionRequest> {
    self
      .run(move |conn| adoption::apply(conn, adopter_id, adoptable_id, &message))
      .await
  }

  async fn applications_by_adopter(&self, adopter_id: i64) -> Result<Vec<ApplicationSummary>> {
    self.run(move |conn| adoption::by_adopter(conn, adopter_id)).await
  }

  async fn incoming_applications(&self, caretaker_id: i64) -> Result<Vec<IncomingApplication>> {
    self.run(move |conn| adoption::incoming(conn, caretaker_id)).await
  }

  async fn get_application(&self, user_id: i64, id: i64) -> Result<AdoptionRequest> {
    self.run(move |conn| adoption::get_for(conn, user_id, id)).await
  }

  async fn set_request_status(
    &self,
    caretaker_id: i64,
    id: i64,
    status: RequestStatus,
  ) -> Result<AdoptionRequest> {
    self
      .run(move |conn| adoption::set_status(conn, caretaker_id, id, status))
      .await
  }

  async fn withdraw_application(&self, adopter_id: i64, id: i64) -> Result<()> {
    self.run(move |conn| adoption::withdraw(conn, adopter_id, id)).await
  }

  // ── Messages ──────────────────────────────────────────────────────────

  async fn send_message(&self, sender_id: i64, request_id: i64, content: String) -> Result<Message> {
    self
      .run(move |conn| messages::send(conn, sender_id, request_id, &content))
      .await
  }

  async fn list_messages(&self, reader_id: i64, request_id: i64) -> Result<Vec<Message>> {
    self.run(move |conn| messages::list(conn, reader_id, request_id)).await
  }

  async fn unread_count(&self, user_id: i64) -> Result<u64> {
    self.run(move |conn| messages::unread_count(conn, user_id)).await
  }

  // ── Owned pets ────────────────────────────────────────────────────────

  async fn create_pet(&self, owner_id: i64, input: NewPet) -> Result<Pet> {
    self.run(move |conn| pets::create(conn, owner_id, input)).await
  }

  async fn list_pets(&self, owner_id: i64) -> Result<Vec<Pet>> {
    self.run(move |conn| pets::list(conn, owner_id)).await
  }

  async fn get_pet(&self, owner_id: i64, id: i64) -> Result<Pet> {
    self.run(move |conn| pets::require_owned(conn, owner_id, id)).await
  }

  async fn update_pet(&self, owner_id: i64, id: i64, update: PetUpdate) -> Result<Pet> {
    self.run(move |conn| pets::update(conn, owner_id, id, update)).await
  }

  async fn delete_pet(&self, owner_id: i64, id: i64) -> Result<Vec<String>> {
    self.run(move |conn| pets::delete(conn, owner_id, id)).await
  }

  async fn add_medical_file(
    &self,
    owner_id: i64,
    pet_id: i64,
    file: NewMedicalFile,
  ) -> Result<MedicalFile> {
    self
      .run(move |conn| pets::add_medical_file(conn, owner_id, pet_id, file))
      .await
  }

  async fn list_medical_files(&self, owner_id: i64, pet_id: i64) -> Result<Vec<MedicalFile>> {
    self
      .run(move |conn| pets::list_medical_files(conn, owner_id, pet_id))
      .await
  }

  async fn delete_medical_file(&self, owner_id: i64, pet_id: i64, file_id: i64) -> Result<String> {
    self
      .run(move |conn| pets::delete_medical_file(conn, owner_id, pet_id, file_id))
      .await
  }

  async fn add_stat(&self, owner_id: i64, pet_id: i64, input: NewHealthStat) -> Result<HealthStat> {
    self
      .run(move |conn| pets::add_stat(conn, owner_id, pet_id, input))
      .await
  }

  async fn list_stats(
    &self,
    owner_id: i64,
    pet_id: i64,
    metric: Option<StatMetric>,
  ) -> Result<Vec<HealthStat>> {
    self
      .run(move |conn| pets::list_stats(conn, owner_id, pet_id, metric))
      .await
  }

  async fn delete_stat(&self, owner_id: i64, pet_id: i64, stat_id: i64) -> Result<()> {
    self
      .run(move |conn| pets::delete_stat(conn, owner_id, pet_id, stat_id))
      .await
  }

  // ── Admin ─────────────────────────────────────────────────────────────

  async fn dashboard_counts(&self) -> Result<DashboardCounts> {
    self.run(|conn| admin::dashboard_counts(conn)).await
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    self.run(|conn| admin::list_users(conn)).await
  }

  async fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<User> {
    self.run(move |conn| admin::set_admin(conn, user_id, is_admin)).await
  }
}
