pub mod db_init;
pub mod price_feed;
pub mod price_monitor;
pub mod push;
pub mod message_templates;

pub mod preference_store;
pub mod quantity_store;
pub mod threshold_matcher;
pub mod notification_dispatcher;
pub mod alert_trigger;
