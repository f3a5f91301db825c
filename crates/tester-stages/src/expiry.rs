use crate::assertions::{expect_bulk_string, expect_null_bulk_string, expect_simple_string};
use crate::words::{random_key, random_word};
use std::time::Duration;
use tester_core::{instrumented, StageContext, TesterError};

const EXPIRY_MS: u64 = 100;

/// SET with PX, read it back, wait past the deadline, expect a null reply.
pub async fn expiry(ctx: StageContext) -> Result<(), TesterError> {
    let mut client = instrumented::connect_to_executable(&ctx, "").await?;
    let key = random_key();
    let value = random_word();

    let reply = client
        .send_and_read(
            "SET",
            &[key.clone(), value.clone(), "px".to_string(), EXPIRY_MS.to_string()],
        )
        .await?;
    expect_simple_string(&reply, "OK")?;

    let reply = client.send_and_read("GET", &[key.clone()]).await?;
    expect_bulk_string(&reply, &value)?;

    ctx.logger()
        .info(format_args!("Sleeping for {}ms", EXPIRY_MS + 1));
    ctx.sleep(Duration::from_millis(EXPIRY_MS + 1)).await?;

    let reply = client.send_and_read("GET", &[key]).await?;
    expect_null_bulk_string(&reply)?;
    ctx.logger().success("Key expired");
    Ok(())
}
