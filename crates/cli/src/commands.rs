//! Subcommands.

use clap::Subcommand;
use corelib::{Router, RouterConfig};

use crate::simulate::{self, SimulateArgs};
use crate::visualize;

/// Result of running a subcommand.
pub type CommandResult = anyhow::Result<()>;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Route a synthetic request stream and report load, latency and hot keys.
    Simulate(SimulateArgs),

    /// Print ring positions and per-server ownership.
    Ring {
        /// Servers to place on the ring.
        #[arg(long, default_value_t = 3)]
        servers: usize,
    },

    /// Print the owning server of each key.
    Route {
        /// Servers to place on the ring.
        #[arg(long, default_value_t = 3)]
        servers: usize,

        /// Keys to route.
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

impl Command {
    pub fn execute(&self, config: &RouterConfig) -> CommandResult {
        match self {
            Command::Simulate(args) => simulate::run(config, args),
            Command::Ring { servers } => {
                let router = populated(config, *servers)?;
                let snapshot = router.snapshot();
                print!("{}", visualize::render_ring(&snapshot));
                print!("{}", visualize::render_ownership(&snapshot));
                Ok(())
            }
            Command::Route { servers, keys } => {
                let router = populated(config, *servers)?;
                for key in keys {
                    let vnode = router.route_vnode(key)?;
                    println!("{key} -> Server {} via {}", vnode.server(), vnode.label());
                }
                Ok(())
            }
        }
    }
}

fn populated(config: &RouterConfig, servers: usize) -> anyhow::Result<Router> {
    let router = Router::from_config(config)?;
    for _ in 0..servers {
        router.add_server();
    }
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_without_servers_fails() {
        let command = Command::Route {
            servers: 0,
            keys: vec!["user-42".to_string()],
        };
        let err = command.execute(&RouterConfig::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<corelib::Error>(),
            Some(&corelib::Error::EmptyRing)
        );
    }

    #[test]
    fn test_ring_command() {
        let command = Command::Ring { servers: 2 };
        command.execute(&RouterConfig::default()).unwrap();
    }
}
