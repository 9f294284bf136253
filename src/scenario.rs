use anyhow::{anyhow, bail, Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::common::Agent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub start_x: i32,
    pub start_y: i32,
    pub goal_x: i32,
    pub goal_y: i32,
}

/// A MovingAI `.scen` file.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub map: String,
    pub map_width: usize,
    pub map_height: usize,
    pub routes: Vec<Route>,
}

impl Scenario {
    pub fn load_from_scen(path: &str) -> Result<Scenario> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file: {path}"))?;
        contents
            .parse()
            .with_context(|| format!("error with scenario file: {path}"))
    }

    /// The first `num_agents` routes of the file, ids in file order.
    pub fn agents(&self, num_agents: usize) -> Result<Vec<Agent>> {
        if self.routes.len() < num_agents {
            bail!(
                "Scenario has {} routes, {num_agents} agents requested",
                self.routes.len()
            );
        }

        let agents: Vec<Agent> = self
            .routes
            .iter()
            .take(num_agents)
            .enumerate()
            .map(|(id, route)| Agent {
                id,
                start: (route.start_x, route.start_y),
                goal: (route.goal_x, route.goal_y),
            })
            .collect();

        info!("Load scen: {agents:?}");
        Ok(agents)
    }

    pub fn load_agents_from_yaml(path: &str) -> Result<Vec<Agent>> {
        let file =
            File::open(path).with_context(|| format!("failed to open agent file: {path}"))?;
        let reader = BufReader::new(file);
        let agents = serde_yaml::from_reader(reader)
            .with_context(|| format!("error with agent file: {path}"))?;
        Ok(agents)
    }

    /// Loads agents from a `.scen` file (all routes unless `num_agents` is given) or a YAML
    /// agent list.
    pub fn load_agents(path: &str, num_agents: Option<usize>) -> Result<Vec<Agent>> {
        let is_scen = Path::new(path)
            .extension()
            .is_some_and(|extension| extension == "scen");

        if is_scen {
            let scenario = Self::load_from_scen(path)?;
            return scenario.agents(num_agents.unwrap_or(scenario.routes.len()));
        }

        let mut agents = Self::load_agents_from_yaml(path)?;
        if let Some(num_agents) = num_agents {
            agents.truncate(num_agents);
        }
        info!("Load agents: {agents:?}");
        Ok(agents)
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(contents: &str) -> Result<Self> {
        let mut lines = contents.lines().filter(|line| !line.trim().is_empty());

        // First line is "version x.x" which we can skip
        let _version = lines.next().ok_or_else(|| anyhow!("empty scenario"))?;

        let mut scenario = Scenario {
            map: String::new(),
            map_width: 0,
            map_height: 0,
            routes: Vec::new(),
        };

        for (index, line) in lines.enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 8 {
                bail!("route {index} has {} fields, expected at least 8", parts.len());
            }
            let field = |i: usize| -> Result<i32> {
                parts[i]
                    .parse()
                    .with_context(|| format!("route {index}: invalid field `{}`", parts[i]))
            };

            // Columns come as (x = column, y = row).
            let route = Route {
                start_x: field(5)?,
                start_y: field(4)?,
                goal_x: field(7)?,
                goal_y: field(6)?,
            };

            if scenario.map.is_empty() {
                // Initialize map details from the first route entry
                scenario.map = parts[1].to_string();
                scenario.map_width = parts[2].parse()?;
                scenario.map_height = parts[3].parse()?;
            }

            scenario.routes.push(route);
        }

        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_scenario() {
        let scen = Scenario::load_from_scen("map_file/test/test.scen").unwrap();
        assert_eq!(scen.map, "test.map");
        assert_eq!((scen.map_width, scen.map_height), (3, 3));
        assert_eq!(scen.routes.len(), 3);

        let agents = scen.agents(2).unwrap();
        let answer = [
            Agent {
                id: 0,
                start: (0, 0),
                goal: (2, 2),
            },
            Agent {
                id: 1,
                start: (0, 2),
                goal: (2, 0),
            },
        ];
        assert_eq!(agents, answer);
        assert!(scen.agents(4).is_err());
    }

    #[test]
    fn test_read_yaml_agents() {
        let agents = Scenario::load_agents("map_file/test/swap.yaml", None).unwrap();
        assert_eq!(agents.len(), 3);
        assert_eq!(agents[2].id, 3);
        assert_eq!(agents[2].goal, (-1, -1));

        let agents = Scenario::load_agents("map_file/test/swap.yaml", Some(2)).unwrap();
        assert_eq!(agents.len(), 2);

        let agents = Scenario::load_agents("map_file/test/test.scen", None).unwrap();
        assert_eq!(agents.len(), 3);
        assert_eq!(agents[2].start, (1, 0));
    }

    #[test]
    fn test_bad_scenario() {
        assert!("".parse::<Scenario>().is_err());
        assert!("version 1\n0 a.map 3 3 0 0\n".parse::<Scenario>().is_err());
        assert!("version 1\n0 a.map 3 3 0 x 2 2 4\n".parse::<Scenario>().is_err());
        assert!(Scenario::load_agents("map_file/test/missing.yaml", None).is_err());
    }
}
