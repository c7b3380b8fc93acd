//! Collision detection for cell-sized hitboxes
//!
//! Every hitbox is an axis-aligned box with half-open extents
//! `[min, min + size)`. Boxes that merely touch along an edge do not overlap,
//! so two adjacent cells never both claim the same hit. Nothing here mutates
//! entities; the tick decides what a hit means.

use glam::Vec2;

use super::entities::{Bullet, Enemy, Player, PowerUp};

/// Player and enemy sprites are 3x2 cells centred horizontally on `pos`
const SHIP_BOX_SIZE: Vec2 = Vec2::new(3.0, 2.0);
const SHIP_BOX_OFFSET: Vec2 = Vec2::new(-1.0, -1.0);
const BULLET_BOX_SIZE: Vec2 = Vec2::new(1.0, 1.0);
const POWERUP_BOX_SIZE: Vec2 = Vec2::new(2.0, 1.0);
const POWERUP_BOX_OFFSET: Vec2 = Vec2::new(-1.0, 0.0);

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Exclusive upper corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Half-open overlap test. Symmetric in its arguments.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }

    /// Min edge inclusive, max edge exclusive
    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x < max.x && point.y >= self.min.y && point.y < max.y
    }
}

pub fn player_box(player: &Player) -> Aabb {
    Aabb::new(player.pos + SHIP_BOX_OFFSET, SHIP_BOX_SIZE)
}

pub fn enemy_box(enemy: &Enemy) -> Aabb {
    Aabb::new(enemy.pos + SHIP_BOX_OFFSET, SHIP_BOX_SIZE)
}

pub fn bullet_box(bullet: &Bullet) -> Aabb {
    Aabb::new(bullet.pos, BULLET_BOX_SIZE)
}

pub fn powerup_box(powerup: &PowerUp) -> Aabb {
    Aabb::new(powerup.pos + POWERUP_BOX_OFFSET, POWERUP_BOX_SIZE)
}

/// An active enemy bullet striking the player
pub fn player_bullet_collision(player: &Player, bullet: &Bullet) -> bool {
    if bullet.is_player() || !bullet.active {
        return false;
    }
    player_box(player).overlaps(&bullet_box(bullet))
}

/// An active player bullet striking an active enemy
pub fn enemy_bullet_collision(enemy: &Enemy, bullet: &Bullet) -> bool {
    if !bullet.is_player() || !bullet.active || !enemy.active {
        return false;
    }
    enemy_box(enemy).overlaps(&bullet_box(bullet))
}

/// The player's ship touching an active enemy
pub fn player_enemy_collision(player: &Player, enemy: &Enemy) -> bool {
    if !enemy.active {
        return false;
    }
    player_box(player).overlaps(&enemy_box(enemy))
}

/// The player touching an active pickup
pub fn player_powerup_collision(player: &Player, powerup: &PowerUp) -> bool {
    if !powerup.active {
        return false;
    }
    player_box(player).overlaps(&powerup_box(powerup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arena;
    use crate::sim::entities::{BulletKind, EnemyKind, PowerUpKind};
    use proptest::prelude::*;

    fn boxed(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_overlap_basic() {
        let a = boxed(0.0, 0.0, 3.0, 2.0);
        assert!(a.overlaps(&boxed(2.0, 1.0, 1.0, 1.0)));
        assert!(!a.overlaps(&boxed(5.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = boxed(0.0, 0.0, 3.0, 2.0);
        // Right neighbour starts exactly on a's exclusive max edge
        assert!(!a.overlaps(&boxed(3.0, 0.0, 1.0, 1.0)));
        assert!(!boxed(3.0, 0.0, 1.0, 1.0).overlaps(&a));
        // Below
        assert!(!a.overlaps(&boxed(0.0, 2.0, 1.0, 1.0)));
        // Left neighbour ending on a's min edge
        assert!(!a.overlaps(&boxed(-1.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_point_min_inclusive_max_exclusive() {
        let a = boxed(1.0, 1.0, 2.0, 2.0);
        assert!(a.contains_point(Vec2::new(1.0, 1.0)));
        assert!(a.contains_point(Vec2::new(2.9, 2.9)));
        assert!(!a.contains_point(Vec2::new(3.0, 1.5)));
        assert!(!a.contains_point(Vec2::new(1.5, 3.0)));
    }

    #[test]
    fn test_bullet_side_rules() {
        let player = Player::new(Arena::default());
        let enemy = Enemy::new(EnemyKind::Bee, 0, player.pos);

        let own_shot = Bullet::player(player.pos, Vec2::ZERO, BulletKind::Normal);
        let enemy_shot = Bullet::enemy(player.pos);

        assert!(!player_bullet_collision(&player, &own_shot));
        assert!(player_bullet_collision(&player, &enemy_shot));
        assert!(enemy_bullet_collision(&enemy, &own_shot));
        assert!(!enemy_bullet_collision(&enemy, &enemy_shot));
    }

    #[test]
    fn test_inactive_entities_never_collide() {
        let player = Player::new(Arena::default());
        let mut enemy = Enemy::new(EnemyKind::Boss, 0, player.pos);
        let mut shot = Bullet::player(player.pos, Vec2::ZERO, BulletKind::Normal);
        let mut pickup = PowerUp::new(player.pos, PowerUpKind::Shield);

        assert!(player_enemy_collision(&player, &enemy));
        assert!(player_powerup_collision(&player, &pickup));

        shot.active = false;
        assert!(!enemy_bullet_collision(&enemy, &shot));
        shot.active = true;
        enemy.active = false;
        assert!(!enemy_bullet_collision(&enemy, &shot));
        assert!(!player_enemy_collision(&player, &enemy));
        pickup.active = false;
        assert!(!player_powerup_collision(&player, &pickup));
    }

    #[test]
    fn test_hitbox_offsets() {
        let mut player = Player::new(Arena::default());
        player.pos = Vec2::new(10.0, 10.0);
        let hb = player_box(&player);
        assert_eq!(hb.min, Vec2::new(9.0, 9.0));
        assert_eq!(hb.max(), Vec2::new(12.0, 11.0));

        // A bullet in the row below the sprite misses
        let shot = Bullet::enemy(Vec2::new(10.0, 11.0));
        assert!(!player_bullet_collision(&player, &shot));
        let shot = Bullet::enemy(Vec2::new(11.5, 10.5));
        assert!(player_bullet_collision(&player, &shot));

        let pickup = PowerUp::new(Vec2::new(10.0, 10.0), PowerUpKind::Bomb);
        assert_eq!(powerup_box(&pickup).min, Vec2::new(9.0, 10.0));
    }

    fn arb_box() -> impl Strategy<Value = Aabb> {
        (-50.0f32..50.0, -50.0f32..50.0, 0.5f32..10.0, 0.5f32..10.0)
            .prop_map(|(x, y, w, h)| boxed(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_box_overlaps_itself(a in arb_box()) {
            prop_assert!(a.overlaps(&a));
        }

        #[test]
        fn prop_outside_never_overlaps(a in arb_box(), gap in 0.01f32..20.0, side in 0u8..4) {
            let max = a.max();
            let other = match side {
                0 => boxed(max.x + gap, a.min.y, 2.0, 2.0),
                1 => boxed(a.min.x - 2.0 - gap, a.min.y, 2.0, 2.0),
                2 => boxed(a.min.x, max.y + gap, 2.0, 2.0),
                _ => boxed(a.min.x, a.min.y - 2.0 - gap, 2.0, 2.0),
            };
            prop_assert!(!a.overlaps(&other));
            prop_assert!(!other.overlaps(&a));
        }
    }
}
