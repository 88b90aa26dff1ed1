use std::collections::HashMap;
use std::sync::OnceLock;

use spyglass_types::ProtocolVersion;
use tracing::debug;

use crate::{PacketKind, RegistryError};

/// One direction's Play-phase id tables: an ascending list of version ranges,
/// each declaring its packet kinds in wire-id order (a kind's position in the
/// list is its id for every version in the range).
///
/// Tables are built lazily, at most once per range; racing first users either
/// block briefly in `OnceLock::get_or_init` or observe the completed table.
/// Reads after that are lock-free.
pub(crate) struct PlayTables {
    ranges: Vec<RangeDecl>,
}

struct RangeDecl {
    floor: ProtocolVersion,
    tokens: &'static [PacketKind],
    table: OnceLock<RegistryTable>,
}

pub(crate) struct RegistryTable {
    by_id: HashMap<i32, PacketKind>,
    by_kind: HashMap<PacketKind, i32>,
}

impl RegistryTable {
    fn build(floor: ProtocolVersion, tokens: &[PacketKind]) -> Self {
        let mut by_id = HashMap::with_capacity(tokens.len());
        let mut by_kind = HashMap::with_capacity(tokens.len());
        for (id, kind) in tokens.iter().enumerate() {
            let id = id as i32;
            by_id.insert(id, *kind);
            let previous = by_kind.insert(*kind, id);
            assert!(
                previous.is_none(),
                "duplicate {kind:?} in table declaration for {floor}"
            );
        }
        debug!("Built play id table for {} ({} kinds)", floor, tokens.len());
        Self { by_id, by_kind }
    }

    pub(crate) fn resolve(&self, id: i32) -> Option<PacketKind> {
        self.by_id.get(&id).copied()
    }

    pub(crate) fn id_of(&self, kind: PacketKind) -> Option<i32> {
        self.by_kind.get(&kind).copied()
    }
}

impl PlayTables {
    pub(crate) fn new(decls: &[(ProtocolVersion, &'static [PacketKind])]) -> Self {
        let ranges: Vec<RangeDecl> = decls
            .iter()
            .map(|(floor, tokens)| RangeDecl {
                floor: *floor,
                tokens,
                table: OnceLock::new(),
            })
            .collect();
        assert!(
            ranges.windows(2).all(|w| w[0].floor < w[1].floor),
            "play table declarations must be ascending by version"
        );
        Self { ranges }
    }

    /// Floor selection: the applicable range is the one with the greatest
    /// lower bound not above `version`.
    pub(crate) fn table_for(
        &self,
        version: ProtocolVersion,
    ) -> Result<&RegistryTable, RegistryError> {
        let idx = self.ranges.partition_point(|r| r.floor <= version);
        if idx == 0 {
            return Err(RegistryError::UnsupportedProtocolVersion(version));
        }
        let range = &self.ranges[idx - 1];
        Ok(range
            .table
            .get_or_init(|| RegistryTable::build(range.floor, range.tokens)))
    }
}

// Declarations for the vanilla protocol. Ids renumber at the floors listed
// here; revisions in between kept the previous layout and floor onto it.
// Extending coverage to a new renumber point is adding one declaration.

use crate::PacketKind::*;

pub(crate) const SERVERBOUND_RANGES: &[(ProtocolVersion, &[PacketKind])] = &[
    (ProtocolVersion::V1_8, SERVERBOUND_1_8),
    (ProtocolVersion::V1_9, SERVERBOUND_1_9),
    (ProtocolVersion::V1_13, SERVERBOUND_1_13),
    (ProtocolVersion::V1_14, SERVERBOUND_1_14),
    (ProtocolVersion::V1_16, SERVERBOUND_1_16),
    (ProtocolVersion::V1_17, SERVERBOUND_1_17),
];

pub(crate) const CLIENTBOUND_RANGES: &[(ProtocolVersion, &[PacketKind])] = &[
    (ProtocolVersion::V1_8, CLIENTBOUND_1_8),
    (ProtocolVersion::V1_9, CLIENTBOUND_1_9),
    (ProtocolVersion::V1_16, CLIENTBOUND_1_16),
];

const SERVERBOUND_1_8: &[PacketKind] = &[
    KeepAliveServerbound,
    ChatMessageServerbound,
    InteractEntity,
    PlayerMovement,
    PlayerPosition,
    PlayerRotation,
    PlayerPositionAndRotation,
    PlayerDigging,
    PlayerBlockPlacement,
    HeldItemChangeServerbound,
    Animation,
    EntityAction,
    SteerVehicle,
    CloseWindowServerbound,
    ClickWindow,
    WindowConfirmationServerbound,
    CreativeInventoryAction,
    ClickWindowButton,
    UpdateSign,
    PlayerAbilitiesServerbound,
    TabCompleteServerbound,
    ClientSettings,
    ClientStatus,
    PluginMessageServerbound,
    Spectate,
    ResourcePackStatus,
];

const SERVERBOUND_1_9: &[PacketKind] = &[
    TeleportConfirm,
    TabCompleteServerbound,
    ChatMessageServerbound,
    ClientStatus,
    ClientSettings,
    WindowConfirmationServerbound,
    ClickWindowButton,
    ClickWindow,
    CloseWindowServerbound,
    PluginMessageServerbound,
    InteractEntity,
    KeepAliveServerbound,
    PlayerPosition,
    PlayerPositionAndRotation,
    PlayerRotation,
    PlayerMovement,
    VehicleMoveServerbound,
    SteerBoat,
    PlayerAbilitiesServerbound,
    PlayerDigging,
    EntityAction,
    SteerVehicle,
    ResourcePackStatus,
    HeldItemChangeServerbound,
    CreativeInventoryAction,
    UpdateSign,
    Animation,
    Spectate,
    PlayerBlockPlacement,
    UseItem,
];

const SERVERBOUND_1_13: &[PacketKind] = &[
    TeleportConfirm,
    QueryBlockNbt,
    ChatMessageServerbound,
    ClientStatus,
    ClientSettings,
    TabCompleteServerbound,
    WindowConfirmationServerbound,
    ClickWindowButton,
    ClickWindow,
    CloseWindowServerbound,
    PluginMessageServerbound,
    EditBook,
    QueryEntityNbt,
    InteractEntity,
    KeepAliveServerbound,
    PlayerMovement,
    PlayerPosition,
    PlayerPositionAndRotation,
    PlayerRotation,
    VehicleMoveServerbound,
    SteerBoat,
    PickItem,
    CraftRecipeRequest,
    PlayerAbilitiesServerbound,
    PlayerDigging,
    EntityAction,
    SteerVehicle,
    RecipeBookData,
    NameItem,
    ResourcePackStatus,
    AdvancementTab,
    SelectTrade,
    SetBeaconEffect,
    HeldItemChangeServerbound,
    UpdateCommandBlock,
    UpdateCommandBlockMinecart,
    CreativeInventoryAction,
    UpdateStructureBlock,
    UpdateSign,
    Animation,
    Spectate,
    PlayerBlockPlacement,
    UseItem,
];

const SERVERBOUND_1_14: &[PacketKind] = &[
    TeleportConfirm,
    QueryBlockNbt,
    SetDifficulty,
    ChatMessageServerbound,
    ClientStatus,
    ClientSettings,
    TabCompleteServerbound,
    WindowConfirmationServerbound,
    ClickWindowButton,
    ClickWindow,
    CloseWindowServerbound,
    PluginMessageServerbound,
    EditBook,
    QueryEntityNbt,
    InteractEntity,
    KeepAliveServerbound,
    LockDifficulty,
    PlayerPosition,
    PlayerPositionAndRotation,
    PlayerRotation,
    PlayerMovement,
    VehicleMoveServerbound,
    SteerBoat,
    PickItem,
    CraftRecipeRequest,
    PlayerAbilitiesServerbound,
    PlayerDigging,
    EntityAction,
    SteerVehicle,
    RecipeBookData,
    NameItem,
    ResourcePackStatus,
    AdvancementTab,
    SelectTrade,
    SetBeaconEffect,
    HeldItemChangeServerbound,
    UpdateCommandBlock,
    UpdateCommandBlockMinecart,
    CreativeInventoryAction,
    UpdateJigsawBlock,
    UpdateStructureBlock,
    UpdateSign,
    Animation,
    Spectate,
    PlayerBlockPlacement,
    UseItem,
];

const SERVERBOUND_1_16: &[PacketKind] = &[
    TeleportConfirm,
    QueryBlockNbt,
    SetDifficulty,
    ChatMessageServerbound,
    ClientStatus,
    ClientSettings,
    TabCompleteServerbound,
    WindowConfirmationServerbound,
    ClickWindowButton,
    ClickWindow,
    CloseWindowServerbound,
    PluginMessageServerbound,
    EditBook,
    QueryEntityNbt,
    InteractEntity,
    GenerateStructure,
    KeepAliveServerbound,
    LockDifficulty,
    PlayerPosition,
    PlayerPositionAndRotation,
    PlayerRotation,
    PlayerMovement,
    VehicleMoveServerbound,
    SteerBoat,
    PickItem,
    CraftRecipeRequest,
    PlayerAbilitiesServerbound,
    PlayerDigging,
    EntityAction,
    SteerVehicle,
    RecipeBookData,
    NameItem,
    ResourcePackStatus,
    AdvancementTab,
    SelectTrade,
    SetBeaconEffect,
    HeldItemChangeServerbound,
    UpdateCommandBlock,
    UpdateCommandBlockMinecart,
    CreativeInventoryAction,
    UpdateJigsawBlock,
    UpdateStructureBlock,
    UpdateSign,
    Animation,
    Spectate,
    PlayerBlockPlacement,
    UseItem,
];

const SERVERBOUND_1_17: &[PacketKind] = &[
    TeleportConfirm,
    QueryBlockNbt,
    SetDifficulty,
    ChatMessageServerbound,
    ClientStatus,
    ClientSettings,
    TabCompleteServerbound,
    WindowConfirmationServerbound,
    ClickWindowButton,
    ClickWindow,
    CloseWindowServerbound,
    PluginMessageServerbound,
    EditBook,
    QueryEntityNbt,
    InteractEntity,
    GenerateStructure,
    KeepAliveServerbound,
    LockDifficulty,
    PlayerPosition,
    PlayerPositionAndRotation,
    PlayerRotation,
    PlayerMovement,
    VehicleMoveServerbound,
    SteerBoat,
    PickItem,
    CraftRecipeRequest,
    PlayerAbilitiesServerbound,
    PlayerDigging,
    EntityAction,
    SteerVehicle,
    Pong,
    SetDisplayedRecipe,
    SetRecipeBookState,
    NameItem,
    ResourcePackStatus,
    AdvancementTab,
    SelectTrade,
    SetBeaconEffect,
    HeldItemChangeServerbound,
    UpdateCommandBlock,
    UpdateCommandBlockMinecart,
    CreativeInventoryAction,
    UpdateJigsawBlock,
    UpdateStructureBlock,
    UpdateSign,
    Animation,
    Spectate,
    PlayerBlockPlacement,
    UseItem,
];

const CLIENTBOUND_1_8: &[PacketKind] = &[
    KeepAliveClientbound,
    JoinGame,
    ChatMessageClientbound,
    TimeUpdate,
    EntityEquipment,
    SpawnPosition,
    UpdateHealth,
    Respawn,
    PlayerPositionAndLook,
    HeldItemChangeClientbound,
    UseBed,
    EntityAnimation,
    SpawnPlayer,
    CollectItem,
    SpawnEntity,
    SpawnLivingEntity,
    SpawnPainting,
    SpawnExperienceOrb,
    EntityVelocity,
    DestroyEntities,
    EntityMovement,
    EntityRelativeMove,
    EntityLook,
    EntityLookAndRelativeMove,
    EntityTeleport,
    EntityHeadLook,
    EntityStatus,
    AttachEntity,
    EntityMetadata,
    EntityEffect,
    RemoveEntityEffect,
    SetExperience,
    EntityProperties,
    ChunkData,
    MultiBlockChange,
    BlockChange,
    BlockAction,
    BlockBreakAnimation,
    MapChunkBulk,
    Explosion,
    Effect,
    SoundEffect,
    Particle,
    ChangeGameState,
    SpawnGlobalEntity,
    OpenWindow,
    CloseWindowClientbound,
    SetSlot,
    WindowItems,
    WindowProperty,
    WindowConfirmationClientbound,
    UpdateSignClientbound,
    MapData,
    BlockEntityData,
    OpenSignEditor,
    Statistics,
    PlayerInfo,
    PlayerAbilitiesClientbound,
    TabCompleteClientbound,
    ScoreboardObjective,
    UpdateScore,
    DisplayScoreboard,
    Teams,
    PluginMessageClientbound,
    Disconnect,
    ServerDifficulty,
    CombatEvent,
    Camera,
    WorldBorder,
    Title,
    SetCompressionPlay,
    PlayerListHeaderAndFooter,
    ResourcePackSend,
    UpdateEntityNbt,
];

const CLIENTBOUND_1_9: &[PacketKind] = &[
    SpawnEntity,
    SpawnExperienceOrb,
    SpawnGlobalEntity,
    SpawnLivingEntity,
    SpawnPainting,
    SpawnPlayer,
    EntityAnimation,
    Statistics,
    BlockBreakAnimation,
    BlockEntityData,
    BlockAction,
    BlockChange,
    BossBar,
    ServerDifficulty,
    TabCompleteClientbound,
    ChatMessageClientbound,
    MultiBlockChange,
    WindowConfirmationClientbound,
    CloseWindowClientbound,
    OpenWindow,
    WindowItems,
    WindowProperty,
    SetSlot,
    SetCooldown,
    PluginMessageClientbound,
    NamedSoundEffect,
    Disconnect,
    EntityStatus,
    Explosion,
    UnloadChunk,
    ChangeGameState,
    KeepAliveClientbound,
    ChunkData,
    Effect,
    Particle,
    JoinGame,
    MapData,
    EntityRelativeMove,
    EntityLookAndRelativeMove,
    EntityLook,
    EntityMovement,
    VehicleMoveClientbound,
    OpenSignEditor,
    PlayerAbilitiesClientbound,
    CombatEvent,
    PlayerInfo,
    PlayerPositionAndLook,
    UseBed,
    DestroyEntities,
    RemoveEntityEffect,
    ResourcePackSend,
    Respawn,
    EntityHeadLook,
    WorldBorder,
    Camera,
    HeldItemChangeClientbound,
    DisplayScoreboard,
    EntityMetadata,
    AttachEntity,
    EntityVelocity,
    EntityEquipment,
    SetExperience,
    UpdateHealth,
    ScoreboardObjective,
    SetPassengers,
    Teams,
    UpdateScore,
    SpawnPosition,
    TimeUpdate,
    Title,
    SoundEffect,
    PlayerListHeaderAndFooter,
    CollectItem,
    EntityTeleport,
    EntityProperties,
    EntityEffect,
];

const CLIENTBOUND_1_16: &[PacketKind] = &[
    SpawnEntity,
    SpawnExperienceOrb,
    SpawnLivingEntity,
    SpawnPainting,
    SpawnPlayer,
    EntityAnimation,
    Statistics,
    AcknowledgePlayerDigging,
    BlockBreakAnimation,
    BlockEntityData,
    BlockAction,
    BlockChange,
    BossBar,
    ServerDifficulty,
    ChatMessageClientbound,
    MultiBlockChange,
    TabCompleteClientbound,
    DeclareCommands,
    WindowConfirmationClientbound,
    CloseWindowClientbound,
    WindowItems,
    WindowProperty,
    SetSlot,
    SetCooldown,
    PluginMessageClientbound,
    NamedSoundEffect,
    Disconnect,
    EntityStatus,
    Explosion,
    UnloadChunk,
    ChangeGameState,
    OpenHorseWindow,
    KeepAliveClientbound,
    ChunkData,
    Effect,
    Particle,
    UpdateLight,
    JoinGame,
    MapData,
    TradeList,
    EntityRelativeMove,
    EntityLookAndRelativeMove,
    EntityLook,
    EntityMovement,
    VehicleMoveClientbound,
    OpenBook,
    OpenWindow,
    OpenSignEditor,
    CraftRecipeResponse,
    PlayerAbilitiesClientbound,
    CombatEvent,
    PlayerInfo,
    FacePlayer,
    PlayerPositionAndLook,
    UnlockRecipes,
    DestroyEntities,
    RemoveEntityEffect,
    ResourcePackSend,
    Respawn,
    EntityHeadLook,
    SelectAdvancementTab,
    WorldBorder,
    Camera,
    HeldItemChangeClientbound,
    UpdateViewPosition,
    UpdateViewDistance,
    SpawnPosition,
    DisplayScoreboard,
    EntityMetadata,
    AttachEntity,
    EntityVelocity,
    EntityEquipment,
    SetExperience,
    UpdateHealth,
    ScoreboardObjective,
    SetPassengers,
    Teams,
    UpdateScore,
    TimeUpdate,
    Title,
    EntitySoundEffect,
    SoundEffect,
    StopSound,
    PlayerListHeaderAndFooter,
    NbtQueryResponse,
    CollectItem,
    EntityTeleport,
    Advancements,
    EntityProperties,
    EntityEffect,
    DeclareRecipes,
    Tags,
];
