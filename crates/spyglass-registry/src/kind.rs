/// Version-independent identity of a packet kind.
///
/// A kind keeps the same variant across every protocol revision even though
/// its numeric wire id changes; the registry maps between the two. Where the
/// same logical name exists in both directions, the variant carries a
/// `Serverbound`/`Clientbound` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    // === Handshake (serverbound) ===
    Handshake,
    /// Pre-1.7 clients open Server List Ping with this; modern servers still
    /// answer it.
    LegacyServerListPing,

    // === Status ===
    StatusRequest,
    StatusPing,
    StatusResponse,
    StatusPong,

    // === Login (serverbound) ===
    LoginStart,
    EncryptionResponse,
    LoginPluginResponse,

    // === Login (clientbound) ===
    LoginDisconnect,
    EncryptionRequest,
    LoginSuccess,
    SetCompression,
    LoginPluginRequest,

    // === Play (serverbound) ===
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
    RecipeBookData,
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

    // === Play (clientbound) ===
    SpawnEntity,
    SpawnExperienceOrb,
    SpawnGlobalEntity,
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
    MapChunkBulk,
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
    UseBed,
    UpdateSignClientbound,
    SetCompressionPlay,
    UpdateEntityNbt,
}
