use clap::{Args, Parser, Subcommand};
use ts43_model::SubscriptionId;

#[derive(Debug, Parser)]
#[command(name = "ts43ctl", about = "TS.43 entitlement client", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct SubscriptionArg {
    /// Subscription id the command applies to
    #[arg(long, short = 's')]
    pub subscription: i32,
}

impl SubscriptionArg {
    pub fn id(&self) -> SubscriptionId {
        SubscriptionId(self.subscription)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query the entitlement server once and print the result
    Query {
        #[command(flatten)]
        target: SubscriptionArg,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Query, then apply the provisioning decision
    Poll {
        #[command(flatten)]
        target: SubscriptionArg,
        /// Stay alive until scheduled follow-up polls have run
        #[arg(long)]
        wait: bool,
    },
    /// Show the cached configuration
    Show {
        #[command(flatten)]
        target: SubscriptionArg,
    },
    /// Drop the cached configuration and token
    Reset {
        #[command(flatten)]
        target: SubscriptionArg,
    },
}
