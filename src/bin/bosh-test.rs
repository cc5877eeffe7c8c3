use bosh_test::Error;


#[tokio::main]
async fn main() -> Result<(), Error> {
    bosh_test::command::run().await
}
