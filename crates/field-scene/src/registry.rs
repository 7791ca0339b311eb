//! Visualisations by name, owned by the session that shows them

use crate::scene::Scene;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SceneRegistry {
    scenes: HashMap<String, Scene>,
    unnamed: usize,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the scene's own name, or `scene-N` when it has none.
    /// Returns the key used and any scene it replaced.
    pub fn register(&mut self, scene: Scene) -> (String, Option<Scene>) {
        let key = match &scene.name {
            Some(name) => name.clone(),
            None => {
                self.unnamed += 1;
                format!("scene-{}", self.unnamed)
            }
        };
        let previous = self.scenes.insert(key.clone(), scene);
        if previous.is_some() {
            log::warn!("Replacing scene '{key}'");
        }
        (key, previous)
    }

    pub fn get(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Scene> {
        self.scenes.remove(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scenes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
