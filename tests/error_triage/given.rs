//! Given steps for error triage BDD scenarios.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use eyre::WrapErr;
use faultline::tag::{
    domain::{Tag, TagName},
    ports::TagRepository,
};
use mockable::DefaultClock;
use rstest_bdd_macros::given;

use super::world::{FixedReply, TriageWorld, run_async};

#[given("a log directory with a recent error and warning")]
fn recent_error_and_warning(world: &mut TriageWorld) -> Result<(), eyre::Report> {
    let stamp = |minutes: i64| {
        (Utc::now() - TimeDelta::minutes(minutes))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    };
    let contents = format!(
        "{debug} [DEBUG] [shop.http] - request parsed\n\
         {warning} [WARNING] [shop.cache] - cache miss ratio above 40%\n\
         {error} [ERROR] [shop.orders] - checkout failed\n\
         Traceback (most recent call last):\n  \
         File \"orders.py\", line 88, in checkout\n\
         KeyError: 'order_id'\n",
        debug = stamp(45),
        warning = stamp(30),
        error = stamp(15),
    );
    world.write_log(&contents).wrap_err("write scenario log file")
}

#[given(r#"a reasoning provider rating errors "{severity}" with confidence {confidence}"#)]
fn provider_rating(world: &mut TriageWorld, severity: String, confidence: String) {
    let reply = format!(
        "{{\"severity\": \"{severity}\", \"is_actionable\": true, \
         \"summary\": \"Checkout is failing\", \"root_cause\": \"Missing order key\", \
         \"recommended_action\": \"Validate the payload\", \"confidence\": {confidence}}}"
    );
    world.provider = Some(Arc::new(FixedReply(reply)));
}

#[given(r#"an unused tag "{name}""#)]
fn unused_tag(world: &mut TriageWorld, name: String) -> Result<(), eyre::Report> {
    let candidate = Tag::new(TagName::new(name)?, &DefaultClock);
    run_async(world.tags.ensure(&candidate)).wrap_err("register unused tag")?;
    Ok(())
}
