use anyhow::{bail, Context as _};

use crate::gpu::{GpuContext, ShaderLibrary};

use super::{Scene, SceneInfo};

/// Fixed, ordered set of scenes with a wrap-around selection.
///
/// Scenes are only ever removed all at once by [`SceneRegistry::teardown`];
/// the cached names and the selection survive it.
pub struct SceneRegistry {
    scenes: Vec<Box<dyn Scene>>,
    infos: Vec<SceneInfo>,
    selected: usize,
}

impl SceneRegistry {
    pub fn new(scenes: Vec<Box<dyn Scene>>) -> anyhow::Result<Self> {
        if scenes.is_empty() {
            bail!("scene registry is empty");
        }

        let infos = scenes.iter().map(|scene| scene.info()).collect();
        Ok(Self {
            scenes,
            infos,
            selected: 0,
        })
    }

    pub fn shader_libraries(&self) -> Vec<ShaderLibrary> {
        self.scenes
            .iter()
            .filter_map(|scene| scene.shader_library())
            .collect()
    }

    /// Runs every scene's setup in order; the first failure aborts.
    pub fn setup_all(&mut self, gpu: &GpuContext) -> anyhow::Result<()> {
        for (scene, info) in self.scenes.iter_mut().zip(&self.infos) {
            scene
                .setup(gpu)
                .with_context(|| format!("failed to set up scene `{}`", info.name))?;
            log::info!("scene `{}` ready: {}", info.name, info.description);
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Always false; an empty registry cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.infos.iter().map(|info| info.name)
    }

    #[inline]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    #[inline]
    pub fn selected_info(&self) -> SceneInfo {
        self.infos[self.selected]
    }

    /// Selects `index` modulo the scene count; negative values count from the end.
    pub fn select(&mut self, index: i64) -> usize {
        let len = self.len() as i64;
        self.selected = index.rem_euclid(len) as usize;
        self.selected
    }

    pub fn select_next(&mut self) -> usize {
        self.select(self.selected as i64 + 1)
    }

    pub fn select_previous(&mut self) -> usize {
        self.select(self.selected as i64 - 1)
    }

    /// The selected scene, or `None` after teardown.
    pub fn selected_mut(&mut self) -> Option<&mut dyn Scene> {
        let scene = self.scenes.get_mut(self.selected)?;
        Some(scene.as_mut())
    }

    /// Drops every scene and the GPU resources it holds.
    pub fn teardown(&mut self) {
        if !self.scenes.is_empty() {
            log::debug!("tearing down {} scene(s)", self.scenes.len());
        }
        self.scenes.clear();
    }

    #[inline]
    pub fn is_torn_down(&self) -> bool {
        self.scenes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{MockBackend, ScriptedScene};

    use super::*;

    fn registry(n: usize) -> SceneRegistry {
        let scenes = (0..n)
            .map(|i| Box::new(ScriptedScene::named(["a", "b", "c", "d"][i % 4])) as Box<dyn Scene>)
            .collect();
        SceneRegistry::new(scenes).unwrap()
    }

    #[test]
    fn empty_registry_is_rejected() {
        assert!(SceneRegistry::new(Vec::new()).is_err());
    }

    #[test]
    fn default_selection_is_first() {
        let reg = registry(3);
        assert_eq!(reg.selected_index(), 0);
        assert_eq!(reg.selected_info().name, "a");
        assert_eq!(reg.names().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn selection_wraps_in_both_directions() {
        let mut reg = registry(3);
        assert_eq!(reg.select_previous(), 2);
        assert_eq!(reg.select_next(), 0);
        assert_eq!(reg.select(4), 1);
        assert_eq!(reg.select(-1), 2);
        assert_eq!(reg.select(-7), 2);
    }

    #[test]
    fn selection_stays_in_range_for_any_index() {
        for n in 1..=4 {
            let mut reg = registry(n);
            for index in [i64::MIN, i64::MIN + 1, -1_000_003, -3, -1, 0, 1, 2, 999, i64::MAX] {
                let selected = reg.select(index);
                assert!(selected < n, "select({index}) gave {selected} for {n} scenes");
            }
        }
    }

    #[test]
    fn setup_failure_names_the_scene() {
        let (backend, _) = MockBackend::new();
        let gpu = GpuContext::new(Box::new(backend), &[]).unwrap();
        let scenes: Vec<Box<dyn Scene>> = vec![
            Box::new(ScriptedScene::named("ok")),
            Box::new(ScriptedScene::named("broken").failing_setup()),
        ];
        let mut reg = SceneRegistry::new(scenes).unwrap();

        let err = reg.setup_all(&gpu).unwrap_err();
        assert!(format!("{err:#}").contains("`broken`"));
    }

    #[test]
    fn teardown_keeps_names_and_selection() {
        let mut reg = registry(2);
        reg.select(1);
        reg.teardown();
        assert!(reg.is_torn_down());
        assert!(reg.selected_mut().is_none());
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.selected_info().name, "b");
    }
}
