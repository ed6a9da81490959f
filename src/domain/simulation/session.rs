//! The whole run: the player, the ordered views and the rules for moving
//! between them.

use bevy::prelude::*;
use rand::Rng;

use super::controller::{Action, MapController, MapEvent};
use super::levels::LevelLibrary;
use super::player::Player;
use super::tense::Tense;
use crate::config::GameConfig;

pub enum View {
    Intro,
    Level(MapController),
    Ending,
}

impl View {
    /// Whether direction keys are withheld from the player.
    pub fn captures_movement(&self) -> bool {
        match self {
            View::Intro | View::Ending => true,
            View::Level(controller) => controller.is_riding(),
        }
    }

    pub fn tense(&self) -> Option<Tense> {
        match self {
            View::Level(controller) => Some(controller.tense()),
            View::Intro | View::Ending => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionEvent {
    TenseChanged(Tense),
    ViewChanged(usize),
    LevelCompleted(usize),
    GameOver,
}

#[derive(Resource)]
pub struct GameSession {
    config: GameConfig,
    pub player: Player,
    views: Vec<View>,
    current: usize,
    elapsed: f32,
    items_collected: u32,
    over: bool,
    events: Vec<SessionEvent>,
}

impl GameSession {
    /// A fresh run: intro, one view per level, ending. The player starts in
    /// the middle of the intro screen.
    pub fn new(config: &GameConfig, library: &LevelLibrary) -> Self {
        let views = std::iter::once(View::Intro)
            .chain(library.controllers().into_iter().map(View::Level))
            .chain(std::iter::once(View::Ending))
            .collect();
        Self {
            config: config.clone(),
            player: Player::new(config.screen() * 0.5, config.player_half_size()),
            views,
            current: 0,
            elapsed: 0.0,
            items_collected: 0,
            over: false,
            events: Vec::new(),
        }
    }

    pub fn current_view(&self) -> usize {
        self.current
    }

    pub fn view(&self) -> &View {
        &self.views[self.current]
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn items_collected(&self) -> u32 {
        self.items_collected
    }

    pub fn is_ending(&self) -> bool {
        matches!(self.view(), View::Ending)
    }

    pub fn active_tense(&self) -> Option<Tense> {
        self.view().tense()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn on_key(&mut self, action: Action) {
        if self.over {
            return;
        }
        let speed = self.config.movement.player_speed;
        let view = &mut self.views[self.current];
        if let Action::Move(heading) = action {
            if !view.captures_movement() {
                self.player.steer(heading, true, speed);
            }
        }
        if let View::Level(controller) = view {
            let before = controller.tense();
            controller.on_input(action, &mut self.player);
            if controller.tense() != before {
                self.events.push(SessionEvent::TenseChanged(controller.tense()));
            }
        }
    }

    pub fn on_key_up(&mut self, action: Action) {
        let speed = self.config.movement.player_speed;
        if let Action::Move(heading) = action {
            self.player.steer(heading, false, speed);
        }
        if let View::Level(controller) = &mut self.views[self.current] {
            controller.on_release(action);
        }
    }

    /// One frame: move, let the active view react, then handle the screen
    /// edges.
    pub fn update<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        if self.over {
            return;
        }
        self.elapsed += dt;

        let view = &mut self.views[self.current];
        let displacement = if view.captures_movement() {
            Vec2::ZERO
        } else {
            self.player.vel * dt
        };
        let outcome = match view {
            View::Level(controller) => controller.tick(dt, &mut self.player, displacement, rng),
            View::Intro | View::Ending => {
                self.player.pos += displacement;
                MapEvent::None
            }
        };

        match outcome {
            MapEvent::GameOver => {
                self.over = true;
                self.events.push(SessionEvent::GameOver);
                return;
            }
            MapEvent::Completed => {
                self.items_collected += 1;
                self.events.push(SessionEvent::LevelCompleted(self.current));
                self.change_view((self.current + 1) % self.views.len());
            }
            MapEvent::None => {}
        }

        self.player.pos.y = self.player.pos.y.clamp(0.0, self.config.window.height);
        self.check_edges();
    }

    /// Jump straight to a view, with the player back at the start position.
    pub fn change_view(&mut self, index: usize) {
        self.player.pos = self.config.player_start();
        self.player.visible = true;
        self.switch_to(index);
    }

    /// Leaves the intro for the first level.
    pub fn start(&mut self) {
        if !matches!(self.view(), View::Intro) {
            return;
        }
        let pad = self.config.movement.border_padding;
        self.player.pos = Vec2::new(pad + 60.0, self.config.window.height / 2.0 - 120.0);
        self.switch_to((self.current + 1) % self.views.len());
    }

    fn check_edges(&mut self) {
        let pad = self.config.movement.border_padding;
        let width = self.config.window.width;
        if self.player.pos.x > width - pad {
            self.player.pos.x = pad;
            self.switch_to((self.current + 1) % self.views.len());
        } else if self.player.pos.x < pad {
            if self.current == 0 {
                self.player.pos.x = pad;
            } else {
                self.player.pos.x = width - pad;
                self.switch_to(self.current - 1);
            }
        }
    }

    fn switch_to(&mut self, index: usize) {
        self.current = index.min(self.views.len() - 1);
        match &mut self.views[self.current] {
            View::Level(controller) => controller.enter(&mut self.player),
            View::Intro | View::Ending => self.player.visible = true,
        }
        debug!("switched to view {}", self.current);
        self.events.push(SessionEvent::ViewChanged(self.current));
    }
}

/// Elapsed time as "1h 2m 3s", leaving out leading zero units.
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0) as u64;
    let (h, m, s) = (total / 3600, total % 3600 / 60, total % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::simulation::level::LevelConfig;
    use crate::domain::simulation::puzzle::Condition;
    use crate::domain::simulation::scene::Scene;
    use crate::domain::simulation::steering::Heading;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn library(completions: Vec<Condition>) -> LevelLibrary {
        LevelLibrary::from_scenes(
            completions
                .into_iter()
                .map(|c| (LevelConfig::empty("test", c), Scene::new(Vec2::new(1040.0, 800.0))))
                .collect(),
        )
        .unwrap()
    }

    fn session(completions: Vec<Condition>) -> GameSession {
        GameSession::new(&GameConfig::default(), &library(completions))
    }

    fn never() -> Condition {
        Condition::Any(vec![])
    }

    #[test]
    fn right_edge_moves_to_the_next_view() {
        let mut s = session(vec![never(), never(), never()]);
        let mut rng = StdRng::seed_from_u64(0);
        s.start();
        assert_eq!(s.current_view(), 1);

        s.player.pos = Vec2::new(1035.0, 321.0);
        s.update(0.0, &mut rng);
        assert_eq!(s.current_view(), 2);
        assert_eq!(s.player.pos, Vec2::new(10.0, 321.0));
    }

    #[test]
    fn left_edge_of_the_first_view_clamps() {
        let mut s = session(vec![never()]);
        let mut rng = StdRng::seed_from_u64(0);
        s.player.pos = Vec2::new(4.0, 200.0);
        s.update(0.0, &mut rng);
        assert_eq!(s.current_view(), 0);
        assert_eq!(s.player.pos, Vec2::new(10.0, 200.0));
    }

    #[test]
    fn left_edge_goes_back_one_view() {
        let mut s = session(vec![never(), never()]);
        let mut rng = StdRng::seed_from_u64(0);
        s.change_view(2);
        s.player.pos.x = 5.0;
        s.update(0.0, &mut rng);
        assert_eq!(s.current_view(), 1);
        assert_eq!(s.player.pos.x, 1030.0);
    }

    #[test]
    fn walking_off_the_ending_wraps_to_the_intro() {
        let mut s = session(vec![never()]);
        let mut rng = StdRng::seed_from_u64(0);
        s.change_view(2);
        assert!(s.is_ending());
        s.player.pos.x = 1039.0;
        s.update(0.0, &mut rng);
        assert_eq!(s.current_view(), 0);
    }

    #[test]
    fn intro_ignores_direction_keys() {
        let mut s = session(vec![never()]);
        let mut rng = StdRng::seed_from_u64(0);
        let at = s.player.pos;
        s.on_key(Action::Move(Heading::Right));
        s.update(0.5, &mut rng);
        assert_eq!(s.player.pos, at);
    }

    #[test]
    fn levels_move_the_player_at_walking_speed() {
        let mut s = session(vec![never()]);
        let mut rng = StdRng::seed_from_u64(0);
        s.start();
        let at = s.player.pos;
        s.on_key(Action::Move(Heading::Up));
        s.update(0.5, &mut rng);
        assert_eq!(s.player.pos, at + Vec2::new(0.0, 150.0));

        s.on_key_up(Action::Move(Heading::Down));
        s.update(0.5, &mut rng);
        assert_eq!(s.player.pos, at + Vec2::new(0.0, 150.0));
    }

    #[test]
    fn y_is_clamped_to_the_screen() {
        let mut s = session(vec![never()]);
        let mut rng = StdRng::seed_from_u64(0);
        s.start();
        s.on_key(Action::Move(Heading::Up));
        s.update(10.0, &mut rng);
        assert_eq!(s.player.pos.y, 800.0);
    }

    #[test]
    fn completing_a_level_counts_an_item_and_advances() {
        let mut s = session(vec![Condition::Always, never()]);
        let mut rng = StdRng::seed_from_u64(0);
        s.start();
        s.drain_events();

        s.update(0.016, &mut rng);
        assert_eq!(s.items_collected(), 1);
        assert_eq!(s.current_view(), 2);
        assert_eq!(s.player.pos, GameConfig::default().player_start());
        assert_eq!(
            s.drain_events(),
            vec![SessionEvent::LevelCompleted(1), SessionEvent::ViewChanged(2)]
        );
    }

    #[test]
    fn space_reports_the_new_tense() {
        let mut s = session(vec![never()]);
        s.start();
        s.drain_events();
        s.on_key(Action::ToggleTense);
        assert_eq!(s.active_tense(), Some(Tense::Past));
        assert_eq!(s.drain_events(), vec![SessionEvent::TenseChanged(Tense::Past)]);
    }

    #[test]
    fn walking_back_into_a_finished_city_is_on_foot() {
        use crate::domain::simulation::levels::city;
        use crate::domain::simulation::scene::GroupId;

        let cfg = GameConfig::default();
        let level = city(&cfg);
        let mut scene = Scene::new(cfg.screen());
        for g in level.required_groups() {
            scene.ensure_group(g);
        }
        let start = Vec2::new(70.0, 280.0);
        scene.spawn(GroupId::Tool, start, Vec2::splat(16.0), None);
        scene.spawn(GroupId::Problem, start, Vec2::splat(16.0), None);
        scene.spawn(GroupId::PresentCar, Vec2::new(120.0, 280.0), Vec2::new(32.0, 16.0), None);
        scene.spawn(GroupId::Destination, Vec2::new(400.0, 280.0), Vec2::new(20.0, 50.0), None);
        let library = LevelLibrary::from_scenes(vec![
            (level, scene),
            (LevelConfig::empty("next", never()), Scene::new(cfg.screen())),
        ])
        .unwrap();
        let mut s = GameSession::new(&cfg, &library);
        let mut rng = StdRng::seed_from_u64(0);
        s.start();
        assert_eq!(s.player.pos, start);

        s.on_key(Action::ToggleTense);
        s.on_key(Action::Interact);
        s.on_key(Action::Interact);
        s.on_key(Action::ToggleTense);
        s.on_key(Action::Interact);
        assert!(!s.player.visible);
        assert!(s.view().captures_movement());

        s.on_key(Action::Move(Heading::Right));
        for _ in 0..20 {
            s.update(0.05, &mut rng);
            if s.current_view() == 2 {
                break;
            }
        }
        assert_eq!(s.current_view(), 2);
        assert_eq!(s.items_collected(), 1);
        s.on_key_up(Action::Move(Heading::Right));

        s.player.pos.x = 5.0;
        s.update(0.0, &mut rng);
        assert_eq!(s.current_view(), 1);
        assert!(s.player.visible);
        assert!(!s.view().captures_movement());

        let at = s.player.pos;
        s.on_key(Action::Move(Heading::Left));
        s.update(0.5, &mut rng);
        assert_eq!(s.player.pos, at - Vec2::new(150.0, 0.0));
    }

    #[test]
    fn time_drops_leading_zero_units() {
        assert_eq!(format_time(0.0), "0s");
        assert_eq!(format_time(59.9), "59s");
        assert_eq!(format_time(61.0), "1m 1s");
        assert_eq!(format_time(3600.0), "1h 0m 0s");
        assert_eq!(format_time(3725.0), "1h 2m 5s");
    }

    #[derive(Clone, Debug)]
    enum Op {
        Key(u8),
        KeyUp(u8),
        Update(f32),
        Start,
        Jump(usize),
    }

    fn action(code: u8) -> Action {
        match code % 6 {
            0 => Action::Move(Heading::Up),
            1 => Action::Move(Heading::Down),
            2 => Action::Move(Heading::Left),
            3 => Action::Move(Heading::Right),
            4 => Action::ToggleTense,
            _ => Action::Interact,
        }
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<u8>().prop_map(Op::Key),
            any::<u8>().prop_map(Op::KeyUp),
            (0.0f32..2.0).prop_map(Op::Update),
            Just(Op::Start),
            (0usize..8).prop_map(Op::Jump),
        ]
    }

    proptest! {
        #[test]
        fn items_collected_never_decreases(ops in prop::collection::vec(op(), 1..80)) {
            let mut s = session(vec![
                Condition::AtLeast(crate::domain::simulation::puzzle::Counter::Tool, 1),
                Condition::In(Tense::Past),
                Condition::Always,
            ]);
            let mut rng = StdRng::seed_from_u64(9);
            let mut last = s.items_collected();
            for op in ops {
                match op {
                    Op::Key(c) => s.on_key(action(c)),
                    Op::KeyUp(c) => s.on_key_up(action(c)),
                    Op::Update(dt) => s.update(dt, &mut rng),
                    Op::Start => s.start(),
                    Op::Jump(i) => s.change_view(i % s.view_count()),
                }
                prop_assert!(s.items_collected() >= last);
                prop_assert!(s.current_view() < s.view_count());
                last = s.items_collected();
            }
        }
    }
}
