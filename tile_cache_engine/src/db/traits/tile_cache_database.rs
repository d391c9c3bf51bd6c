/// This trait defines the behaviour common to all tile cache backends.
#[allow(async_fn_in_trait)]
pub trait TileCacheDatabase: Clone {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
